use crate::error::{AppError, AppResult};
use regex::Regex;

/// 用户名: 3-20 位字母、数字或下划线
pub fn validate_username(username: &str) -> AppResult<()> {
    let username_regex = Regex::new(r"^[A-Za-z0-9_]{3,20}$")
        .map_err(|e| AppError::InternalError(format!("用户名正则无效: {e}")))?;

    if !username_regex.is_match(username) {
        return Err(AppError::ValidationError(
            "用户名必须是3-20位字母、数字或下划线".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| AppError::InternalError(format!("邮箱正则无效: {e}")))?;

    if email.len() > 255 || !email_regex.is_match(email) {
        return Err(AppError::ValidationError("邮箱格式无效".to_string()));
    }

    Ok(())
}

/// 统一邮箱格式（去空白、小写）
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// 金额必须为正数 (美分)
pub fn validate_amount(amount: i64, min: i64, max: Option<i64>) -> AppResult<()> {
    if amount <= 0 || amount < min {
        return Err(AppError::ValidationError(format!("金额不能低于 {min}")));
    }
    if let Some(max) = max.filter(|&max| amount > max) {
        return Err(AppError::ValidationError(format!("金额不能超过 {max}")));
    }
    Ok(())
}
