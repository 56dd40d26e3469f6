//! 客户端本地校验
//!
//! 所有检查都在发出网络请求之前完成，失败时直接返回可展示的错误文案。

use crate::{
    ALLOWED_UPLOAD_EXTENSIONS, Agent, CreateAgentRequest, LoginRequest, MAX_UPLOAD_BYTES,
    RegisterRequest, UpdateAgentRequest,
};
use thiserror::Error;

// =========================================================
// 表单校验
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

fn all_filled(fields: &[&str]) -> bool {
    fields.iter().all(|f| !f.trim().is_empty())
}

/// 代理创建/编辑对话框的表单数据
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentForm {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
    pub is_active: bool,
}

impl AgentForm {
    /// 空白表单，新代理默认启用
    pub fn blank() -> Self {
        Self {
            is_active: true,
            ..Default::default()
        }
    }

    /// 以现有代理预填编辑表单，密码字段留空
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            name: agent.name.clone(),
            email: agent.email.clone(),
            mobile: agent.mobile.clone(),
            password: String::new(),
            confirm_password: String::new(),
            is_active: agent.is_active,
        }
    }

    pub fn to_create_request(&self) -> Result<CreateAgentRequest, FormError> {
        if !all_filled(&[&self.name, &self.email, &self.mobile, &self.password]) {
            return Err(FormError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(CreateAgentRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub fn to_update_request(&self) -> Result<UpdateAgentRequest, FormError> {
        if !all_filled(&[&self.name, &self.email, &self.mobile]) {
            return Err(FormError::MissingFields);
        }
        Ok(UpdateAgentRequest {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            mobile: Some(self.mobile.trim().to_string()),
            is_active: Some(self.is_active),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> Result<LoginRequest, FormError> {
        if !all_filled(&[&self.email, &self.password]) {
            return Err(FormError::MissingFields);
        }
        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, FormError> {
        if !all_filled(&[&self.email, &self.password]) {
            return Err(FormError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

// =========================================================
// 上传文件校验
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Please select a valid CSV or Excel file (.csv, .xlsx, .xls)")]
    UnsupportedType,
    #[error("File size must be less than 5MB")]
    TooLarge,
}

/// 待上传文件的元信息 (浏览器 File 对象的可测试投影)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl FileMeta {
    /// 小写扩展名，没有 `.` 时为 None
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() && ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// 扩展名必须在白名单内；大小不得超过上限 (恰好 5 MiB 允许)
pub fn validate_upload(file: &FileMeta) -> Result<(), UploadRejection> {
    let allowed = file
        .extension()
        .is_some_and(|ext| ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        return Err(UploadRejection::UnsupportedType);
    }
    if file.size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge);
    }
    Ok(())
}
