//! A small blocking client for the Petfinder v2 API.
//!
//! The flow is: exchange client credentials for a bearer token, search for
//! adoptable dogs near a location, and map each animal into a [`Dog`].
//!
//! ## Quick start
//! - Configure credentials via environment variables (`PETFINDER_KEY`,
//!   `PETFINDER_SECRET`) or a `.petfinderrc` file (current directory or home
//!   directory), or pass a [`ClientConfig`] explicitly.
//! - Build a [`PetfinderRepository`] for a location and call
//!   [`PetfinderRepository::get_dogs_by_location`].
//!
//! ```no_run
//! use anyhow::Result;
//! use petfinder::PetfinderRepository;
//!
//! fn main() -> Result<()> {
//!     let repo = PetfinderRepository::from_env("23220")?;
//!     for dog in repo.get_dogs_by_location()? {
//!         println!("{} ({}, {} photos)", dog.name, dog.gender, dog.photos.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Errors are returned as [`anyhow::Error`]; downcast to [`Error`] to tell a
//! missing configuration, a rejected request or a malformed payload apart.

#![forbid(unsafe_code)]

mod config;
mod dog;
pub mod envelope;
mod error;
mod repository;
mod token;

pub use config::{ClientConfig, Credentials, DEFAULT_URL};
pub use dog::{Dog, PhotoSet};
pub use envelope::ResponseKind;
pub use error::Error;
pub use repository::{MalformedRecords, PetfinderRepository};
pub use token::{TokenProvider, get_access_token};
