//! Menu choices and record-session sentinels

use std::str::FromStr;

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Record,
    Save,
    NonConformanceReport,
    Summary,
    HarmonicsAnalysis,
    Aggregate,
    ExitAndSave,
}

impl MenuAction {
    pub const ALL: [MenuAction; 7] = [
        MenuAction::Record,
        MenuAction::Save,
        MenuAction::NonConformanceReport,
        MenuAction::Summary,
        MenuAction::HarmonicsAnalysis,
        MenuAction::Aggregate,
        MenuAction::ExitAndSave,
    ];

    pub const fn key(&self) -> &'static str {
        match self {
            MenuAction::Record => "1",
            MenuAction::Save => "2",
            MenuAction::NonConformanceReport => "3",
            MenuAction::Summary => "4",
            MenuAction::HarmonicsAnalysis => "5",
            MenuAction::Aggregate => "6",
            MenuAction::ExitAndSave => "S",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            MenuAction::Record => "Record measurements",
            MenuAction::Save => "Save circuits",
            MenuAction::NonConformanceReport => "Non-conformance report",
            MenuAction::Summary => "Electrical summary",
            MenuAction::HarmonicsAnalysis => "Harmonics analysis",
            MenuAction::Aggregate => "Total apparent power",
            MenuAction::ExitAndSave => "Save and exit",
        }
    }
}

impl FromStr for MenuAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "record" => Ok(MenuAction::Record),
            "2" | "save" => Ok(MenuAction::Save),
            "3" | "report" | "nonconformance" => Ok(MenuAction::NonConformanceReport),
            "4" | "summary" => Ok(MenuAction::Summary),
            "5" | "harmonics" | "thd" => Ok(MenuAction::HarmonicsAnalysis),
            "6" | "aggregate" | "power" => Ok(MenuAction::Aggregate),
            "s" | "0" | "exit" | "quit" => Ok(MenuAction::ExitAndSave),
            other => Err(format!("unknown option {:?}", other)),
        }
    }
}

/// Words that end a record session, matched case-insensitively
const END_OF_SESSION: [&str; 4] = ["done", "exit", "fim", "sair"];

/// `true` when a record-session input line means "back to the menu"
pub fn ends_session(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || END_OF_SESSION
            .iter()
            .any(|word| word.eq_ignore_ascii_case(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back_to_actions() {
        for action in MenuAction::ALL {
            assert_eq!(action.key().parse::<MenuAction>(), Ok(action));
        }
    }

    #[test]
    fn aliases_and_case() {
        assert_eq!(" s ".parse::<MenuAction>(), Ok(MenuAction::ExitAndSave));
        assert_eq!("Harmonics".parse::<MenuAction>(), Ok(MenuAction::HarmonicsAnalysis));
        assert!("9".parse::<MenuAction>().is_err());
    }

    #[test]
    fn session_sentinels() {
        assert!(ends_session(""));
        assert!(ends_session("  "));
        assert!(ends_session("DONE"));
        assert!(ends_session("fim"));
        assert!(!ends_session("Panel A; V=220"));
        assert!(!ends_session("done; V=220"));
    }
}
