// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup and becomes immutable for the process lifetime.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the embedded database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SECRET_KEY` | Symmetric token signing secret | Required |
//! | `TOKEN_ALGORITHM` | HMAC signing algorithm (`HS256`/`HS384`/`HS512`) | `HS256` |
//! | `TOKEN_TTL_MINUTES` | Access token lifetime in minutes | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use thiserror::Error;

/// Environment variable name for the database directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default database directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the token signing secret.
///
/// Absence of this variable is a fatal boot-time condition: the server
/// refuses to start rather than issue unverifiable tokens.
pub const SECRET_KEY_ENV: &str = "SECRET_KEY";

/// Environment variable name for the token signing algorithm.
pub const TOKEN_ALGORITHM_ENV: &str = "TOKEN_ALGORITHM";

/// Environment variable name for the access token lifetime in minutes.
pub const TOKEN_TTL_MINUTES_ENV: &str = "TOKEN_TTL_MINUTES";

/// Default access token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Fatal configuration errors detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY not found in environment variables")]
    MissingSecret,

    #[error("unsupported token algorithm {0:?} (expected HS256, HS384, or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid TOKEN_TTL_MINUTES value {0:?}")]
    InvalidTokenTtl(String),
}
