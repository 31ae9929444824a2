// SPDX-License-Identifier: MPL-2.0

/// SQL schema for the offline snapshot cache
pub const SCHEMA: &str = r#"
-- Database version for migrations
PRAGMA user_version = 1;

-- snapshots: last successfully fetched collection per city, stored as JSON
CREATE TABLE IF NOT EXISTS snapshots (
    city TEXT NOT NULL,
    collection TEXT NOT NULL,
    payload TEXT NOT NULL,
    fetched_at INTEGER NOT NULL,
    PRIMARY KEY (city, collection)
);

CREATE INDEX IF NOT EXISTS idx_snapshots_fetched_at ON snapshots(fetched_at);
"#;
