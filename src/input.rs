use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Refresh,
    OpenSymbolSelector,
    RemoveSelected,
    Export,
    SelectUp,
    SelectDown,
    NextBoardCategory,
    NextBoardPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorCommand {
    Type(char),
    Backspace,
    Up,
    Down,
    Confirm,
    Close,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Up => Some(UiCommand::SelectUp),
        KeyCode::Down => Some(UiCommand::SelectDown),
        KeyCode::Delete => Some(UiCommand::RemoveSelected),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'r' => Some(UiCommand::Refresh),
            'a' => Some(UiCommand::OpenSymbolSelector),
            'x' => Some(UiCommand::RemoveSelected),
            'e' => Some(UiCommand::Export),
            'k' => Some(UiCommand::SelectUp),
            'j' => Some(UiCommand::SelectDown),
            'b' => Some(UiCommand::NextBoardCategory),
            'p' => Some(UiCommand::NextBoardPeriod),
            _ => None,
        },
        _ => None,
    }
}

/// Keys inside the symbol selector popup. Printable characters feed the search box.
pub fn parse_selector_command(key_code: &KeyCode) -> Option<SelectorCommand> {
    match key_code {
        KeyCode::Esc => Some(SelectorCommand::Close),
        KeyCode::Enter => Some(SelectorCommand::Confirm),
        KeyCode::Up => Some(SelectorCommand::Up),
        KeyCode::Down => Some(SelectorCommand::Down),
        KeyCode::Backspace => Some(SelectorCommand::Backspace),
        KeyCode::Char(c) if !c.is_control() => Some(SelectorCommand::Type(*c)),
        _ => None,
    }
}
