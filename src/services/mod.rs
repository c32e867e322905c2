// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod avatar;
pub mod backup;
pub mod mailer;
pub mod merge;
pub mod otp;
pub mod password;
pub mod password_reset;
pub mod qr;
pub mod share_code;

pub use backup::{ApplyResult, BackupOptions, BackupService, BackupSummary};
pub use mailer::MailerService;
pub use merge::{plan_import, ImportPlan};
pub use password_reset::PasswordResetService;
