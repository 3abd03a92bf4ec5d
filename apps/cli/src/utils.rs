//! 用户交互工具

use anyhow::{Context, Result};
use inquire::Password;

/// 交互式输入 SSH 密码
pub fn prompt_password(user: &str, host: &str) -> Result<String> {
    Password::new(&format!("{}@{} 的密码:", user, host))
        .without_confirmation()
        .prompt()
        .context("读取密码失败")
}
