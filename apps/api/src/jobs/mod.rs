// Job postings: public listing, recruiter-managed CRUD.

pub mod handlers;
pub mod repository;
