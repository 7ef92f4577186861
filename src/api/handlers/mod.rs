//! API handlers.
//!
//! `auth` owns the Stytch session flow; `users` mirrors identities into
//! Postgres; `health` and `root` are public.

pub mod auth;
pub mod health;
pub mod root;
pub mod users;
