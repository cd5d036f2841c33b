use crate::model::{CurrentWeather, WeeklyWeather};

/// Which of the three view branches the widget is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Loading,
    Error,
    Ready,
}

impl UiState {
    /// Loading wins over error, error wins over ready.
    pub fn from_flags(loading: bool, error: bool) -> Self {
        match (loading, error) {
            (true, _) => UiState::Loading,
            (false, true) => UiState::Error,
            (false, false) => UiState::Ready,
        }
    }
}

/// Everything the view needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    /// `None` until the first successful fetch.
    pub current: Option<CurrentWeather>,
    pub weekly: Option<WeeklyWeather>,
    /// Set while a current-weather fetch (and its forecast follow-up) runs.
    pub loading: bool,
    pub error: bool,
}

impl WidgetState {
    pub fn ui_state(&self) -> UiState {
        UiState::from_flags(self.loading, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_takes_precedence_over_error() {
        assert_eq!(UiState::from_flags(true, true), UiState::Loading);
        assert_eq!(UiState::from_flags(true, false), UiState::Loading);
        assert_eq!(UiState::from_flags(false, true), UiState::Error);
        assert_eq!(UiState::from_flags(false, false), UiState::Ready);
    }

    #[test]
    fn default_state_is_ready_and_empty() {
        let state = WidgetState::default();
        assert_eq!(state.ui_state(), UiState::Ready);
        assert!(state.current.is_none());
        assert!(state.weekly.is_none());
    }
}
