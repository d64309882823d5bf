// This file is part of the product InkWave.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use openssl::rand::rand_bytes;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_WORKERS: u16 = 4;
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

pub fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join("config.yaml");

    if config_path.exists() {
        return Ok(false);
    }

    let jwt_secret = generate_jwt_secret()?;
    let contents = default_config_yaml(&jwt_secret);

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    log_action(format!(
        "created config.yaml (port {}); fill in auth.google before logging in",
        DEFAULT_PORT
    ));

    Ok(true)
}

fn generate_jwt_secret() -> Result<String, BootstrapError> {
    let mut bytes = [0u8; 32];
    rand_bytes(&mut bytes).map_err(|err| {
        BootstrapError::Io(io::Error::other(format!(
            "Failed to generate JWT secret: {}",
            err
        )))
    })?;

    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push_str(&format!("{:02x}", byte));
    }

    Ok(hex)
}

fn default_config_yaml(jwt_secret: &str) -> String {
    format!(
        "server:\n  host: \"127.0.0.1\"\n  port: {port}\n  workers: {workers}\n\napp:\n  name: \"InkWave\"\n  description: \"A social blogging platform\"\n  environment: \"development\"\n\nclient:\n  url: \"{client_url}\"\n\nauth:\n  jwt:\n    secret: \"{jwt_secret}\"\n    expiration_hours: 168\n    cookie_name: \"token\"\n  google:\n    client_id: \"replace-me.apps.googleusercontent.com\"\n    client_secret: \"replace-me\"\n    callback_url: \"http://localhost:{port}/api/auth/google/callback\"\n\nlogging:\n  level: \"info\"\n\nstorage:\n  file_name: \"inkwave.json\"\n",
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
        client_url = DEFAULT_CLIENT_URL,
        jwt_secret = jwt_secret,
    )
}
