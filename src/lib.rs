//! CareDesk — hospital appointment booking and medical records backend.
//!
//! Two SQLite stores back the system: the *directory* store holds
//! users, doctors, appointments and auth tokens; the *clinical* store
//! holds patient charts, medical records, prescriptions, vital signs
//! and lab results. The HTTP API in [`api`] serves three audiences
//! (patients, doctors, admins) over the shared [`state::AppState`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod roster;
pub mod state;
