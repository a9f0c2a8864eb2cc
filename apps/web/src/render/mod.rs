// Presentation: the ranked results table and the page around it.
// Rendering never mutates session state.

pub mod page;
pub mod results;
