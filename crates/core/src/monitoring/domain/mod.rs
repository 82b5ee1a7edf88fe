pub mod alert_board;
pub mod visibility_rules;
