use std::fmt;

use anyhow::Result;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("user id must not be empty".to_string()).into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is rendering and what they have selected, passed explicitly to every
/// watchlist operation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: UserId,
    pub selected_symbol: Option<String>,
}

impl SessionContext {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            selected_symbol: None,
        }
    }

    pub fn user(&self) -> &str {
        self.user.as_str()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected_symbol.as_deref()
    }

    pub fn select(&mut self, symbol: Option<String>) {
        self.selected_symbol = symbol;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_trims_and_rejects_blank() {
        assert_eq!(UserId::new("  partha ").unwrap().as_str(), "partha");
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn selection_is_replaced_and_cleared() {
        let mut ctx = SessionContext::new(UserId::new("partha").unwrap());
        assert_eq!(ctx.selected(), None);
        ctx.select(Some("TCS.NS".to_string()));
        assert_eq!(ctx.selected(), Some("TCS.NS"));
        ctx.select(None);
        assert_eq!(ctx.selected(), None);
    }
}
