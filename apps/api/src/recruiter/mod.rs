// Recruiter dashboard: ranked candidates, interview listings and totals.

pub mod handlers;
pub mod repository;
