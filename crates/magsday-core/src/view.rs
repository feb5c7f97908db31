//! Top-level views of the dashboard.

/// Which panel is shown. Switching is purely local.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Dashboard,
    Schedules,
    Payments,
    Accomplishments,
    Settings,
}

impl View {
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Schedules,
        Self::Payments,
        Self::Accomplishments,
        Self::Settings,
    ];

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Schedules => "Schedules",
            Self::Payments => "Payments",
            Self::Accomplishments => "Triumphs",
            Self::Settings => "Settings",
        }
    }
}
