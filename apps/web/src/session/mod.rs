// Session: the single in-memory user session and its web handlers.
// Holds the job description, the resume selection and the latest ranked results.
// All calls to the analysis service go through service_client.

pub mod controller;
pub mod handlers;
pub mod reporter;

#[cfg(test)]
pub mod testing;
