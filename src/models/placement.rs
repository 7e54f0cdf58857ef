use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where to put a story in a backlog.
///
/// Serializes as `"head"`, `"bottom"`, `{"above": "<id>"}` or `{"below": "<id>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Immediately before the referenced story, or at the tail if it is unranked.
    Above(Uuid),
    /// Immediately after the referenced story, or at the tail if it is unranked.
    Below(Uuid),
    /// Before the current first story.
    Head,
    /// After the current last story.
    Bottom,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above(_) => "above",
            Self::Below(_) => "below",
            Self::Head => "head",
            Self::Bottom => "bottom",
        }
    }

    /// The story this placement is relative to, if any.
    pub fn reference(&self) -> Option<Uuid> {
        match self {
            Self::Above(id) | Self::Below(id) => Some(*id),
            Self::Head | Self::Bottom => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_serializes_in_snake_case() {
        let id = Uuid::nil();
        assert_eq!(serde_json::to_string(&Placement::Head).unwrap(), "\"head\"");
        assert_eq!(
            serde_json::to_string(&Placement::Above(id)).unwrap(),
            format!("{{\"above\":\"{}\"}}", id)
        );

        let parsed: Placement =
            serde_json::from_str(&format!("{{\"below\":\"{}\"}}", id)).unwrap();
        assert_eq!(parsed, Placement::Below(id));
    }

    #[test]
    fn test_reference_only_for_relative_placements() {
        let id = Uuid::new_v4();
        assert_eq!(Placement::Above(id).reference(), Some(id));
        assert_eq!(Placement::Below(id).reference(), Some(id));
        assert_eq!(Placement::Head.reference(), None);
        assert_eq!(Placement::Bottom.reference(), None);
    }
}
