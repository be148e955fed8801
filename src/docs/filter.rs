use std::fmt;
use std::str::FromStr;

/// Which documents a list fetch asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Selected,
    Unselected,
}

impl ListFilter {
    /// The `selected=` constraint for the list endpoint, `None` for no constraint.
    pub fn constraint(self) -> Option<bool> {
        match self {
            ListFilter::All => None,
            ListFilter::Selected => Some(true),
            ListFilter::Unselected => Some(false),
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListFilter::All => "all",
            ListFilter::Selected => "selected",
            ListFilter::Unselected => "unselected",
        })
    }
}

impl FromStr for ListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ListFilter::All),
            "selected" | "on" => Ok(ListFilter::Selected),
            "unselected" | "not-selected" | "off" => Ok(ListFilter::Unselected),
            other => Err(format!(
                "unknown filter `{}` (expected all, selected or unselected)",
                other
            )),
        }
    }
}

/// Remembers the active filter mode for highlighting; never holds data.
#[derive(Debug, Default)]
pub struct FilterSelector {
    active: ListFilter,
}

impl FilterSelector {
    pub fn active(&self) -> ListFilter {
        self.active
    }

    /// Switch mode and return the constraint for the load it triggers.
    pub fn select(&mut self, mode: ListFilter) -> Option<bool> {
        self.active = mode;
        mode.constraint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_constraints() {
        assert_eq!(ListFilter::All.constraint(), None);
        assert_eq!(ListFilter::Selected.constraint(), Some(true));
        assert_eq!(ListFilter::Unselected.constraint(), Some(false));
    }

    #[test]
    fn selector_tracks_active_mode() {
        let mut selector = FilterSelector::default();
        assert_eq!(selector.active(), ListFilter::All);
        assert_eq!(selector.select(ListFilter::Unselected), Some(false));
        assert_eq!(selector.active(), ListFilter::Unselected);
    }

    #[test]
    fn parses_console_words() {
        assert_eq!("Selected".parse::<ListFilter>(), Ok(ListFilter::Selected));
        assert_eq!("off".parse::<ListFilter>(), Ok(ListFilter::Unselected));
        assert_eq!(" all ".parse::<ListFilter>(), Ok(ListFilter::All));
        assert!("some".parse::<ListFilter>().is_err());
    }
}
