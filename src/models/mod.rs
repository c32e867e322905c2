// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod backup;
pub mod contact;
pub mod group;
pub mod reset_token;
pub mod user;

pub use backup::{BackupCodeEntry, BackupRecord, SharedContact};
pub use contact::{Contact, ContactKey};
pub use group::Group;
pub use reset_token::ResetToken;
pub use user::User;
