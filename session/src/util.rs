use graph_lens_core::Direction;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction '{0}', use 'downstream' or 'upstream'")]
pub struct ParseDirectionError(pub String);

/// Parse a traversal direction (case-insensitive).
///
/// Accepts "downstream"/"outgoing"/"out" and "upstream"/"incoming"/"in".
pub fn parse_direction(s: &str) -> Result<Direction, ParseDirectionError> {
    match s.trim().to_lowercase().as_str() {
        "downstream" | "down" | "outgoing" | "out" => Ok(Direction::Downstream),
        "upstream" | "up" | "incoming" | "in" => Ok(Direction::Upstream),
        other => Err(ParseDirectionError(other.to_string())),
    }
}

pub fn direction_str(d: Direction) -> &'static str {
    match d {
        Direction::Downstream => "downstream",
        Direction::Upstream => "upstream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("OUT"), Ok(Direction::Downstream));
        assert_eq!(parse_direction(" incoming "), Ok(Direction::Upstream));
        assert_eq!(
            parse_direction("both"),
            Err(ParseDirectionError("both".into()))
        );
        assert_eq!(direction_str(Direction::Upstream), "upstream");
    }
}
