// src/domain/mod.rs

pub mod aggregates;
pub mod calendar;
pub mod conversation;
pub mod entities;
pub mod patient;
pub mod quick_reply;
pub mod vocab;
