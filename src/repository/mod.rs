pub mod toy_repository;
