// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! GraphQL documents sent to Warcraft Logs.
//!
//! Caller-supplied strings only ever enter a document through
//! [`string_literal`], which emits a complete, escaped GraphQL string value.

use serde_json::Value;

/// Render `value` as a quoted GraphQL string literal.
///
/// JSON string escaping is a subset of GraphQL's, so the serialized JSON
/// string is a valid literal with quotes, backslashes and control characters
/// escaped.
pub fn string_literal(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}

/// Character identity plus its most recent report and that report's fights.
pub fn character_query(name: &str, server_slug: &str, server_region: &str) -> String {
    format!(
        r#"{{
  characterData {{
    character(name: {name}, serverSlug: {slug}, serverRegion: {region}) {{
      name
      classID
      recentReports(limit: 1) {{
        data {{
          code
          startTime
          fights {{
            id
            name
          }}
        }}
      }}
    }}
  }}
}}"#,
        name = string_literal(name),
        slug = string_literal(server_slug),
        region = string_literal(server_region),
    )
}

/// Player roster and per-role player details for one fight of a report.
pub fn report_gear_query(report_code: &str, fight_id: i64) -> String {
    format!(
        r#"{{
  reportData {{
    report(code: {code}) {{
      masterData {{
        actors(type: "Player") {{
          name
          type
          subType
          gameID
        }}
      }}
      playerDetails(fightIDs: [{fight_id}])
    }}
  }}
}}"#,
        code = string_literal(report_code),
    )
}
