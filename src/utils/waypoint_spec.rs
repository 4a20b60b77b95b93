//! Command line waypoint syntax: `IDENT[/NAME]@ALTITUDE`
use std::sync::OnceLock;

use regex::Regex;

use crate::plan::WaypointId;
use crate::screens::WaypointDraft;

fn spec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<ident>[^/@]+?)(?:/(?P<name>[^@]*))?@(?P<alt>-?\d+(?:\.\d+)?)$")
            .expect("waypoint spec regex is valid")
    })
}

/// Parse `ALPHA/Alpha VOR@5000` into a sub-form draft
pub fn parse_waypoint(spec: &str) -> Result<WaypointDraft, String> {
    let caps = spec_regex()
        .captures(spec.trim())
        .ok_or_else(|| format!("Invalid waypoint '{}', expected IDENT[/NAME]@ALTITUDE", spec))?;

    let altitude = caps["alt"]
        .parse::<f64>()
        .map_err(|e| format!("Invalid altitude in '{}': {}", spec, e))?;

    Ok(WaypointDraft {
        ident: caps["ident"].trim().to_string(),
        name: caps.name("name").map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        altitude,
    })
}

/// Parse `ID=SPEC`, naming an existing waypoint to replace
pub fn parse_waypoint_edit(arg: &str) -> Result<(WaypointId, WaypointDraft), String> {
    let (id, spec) = arg
        .split_once('=')
        .ok_or_else(|| format!("Invalid waypoint edit '{}', expected ID=IDENT[/NAME]@ALTITUDE", arg))?;

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("Missing waypoint id in '{}'", arg));
    }

    Ok((WaypointId::from(id), parse_waypoint(spec)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_and_altitude() {
        let draft = parse_waypoint("ALPHA@5000").unwrap();
        assert_eq!(draft.ident, "ALPHA");
        assert_eq!(draft.name, "");
        assert_eq!(draft.altitude, 5000.0);
    }

    #[test]
    fn test_with_name() {
        let draft = parse_waypoint("BIG/Biggin Hill VOR@2500.5").unwrap();
        assert_eq!(draft.ident, "BIG");
        assert_eq!(draft.name, "Biggin Hill VOR");
        assert_eq!(draft.altitude, 2500.5);
    }

    #[test]
    fn test_rejects_missing_altitude() {
        assert!(parse_waypoint("ALPHA").is_err());
        assert!(parse_waypoint("ALPHA@high").is_err());
        assert!(parse_waypoint("@5000").is_err());
    }

    #[test]
    fn test_edit_arg() {
        let (id, draft) = parse_waypoint_edit("n1=ALPHA@6000").unwrap();
        assert_eq!(id.as_str(), "n1");
        assert_eq!(draft.altitude, 6000.0);

        assert!(parse_waypoint_edit("ALPHA@6000").is_err());
        assert!(parse_waypoint_edit("=ALPHA@6000").is_err());
    }
}
