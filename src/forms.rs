//! Form state shared by every modal: login, task create/update, user
//! create/update. Each form is a [`FormSpec`] (ordered fields, a validator per
//! field and a role predicate per field) driving one [`FormState`].

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::ClientError;
use crate::models::{Task, TaskDraft, TaskStatus, User, UserDraft};
use crate::session::{Session, PM_ROLE};

const STATUS_VALUES: &[&str] = &["todo", "on progress", "done"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Required,
    Email,
    OneOf(&'static [&'static str]),
    Date,
    Integer,
    Optional,
}

/// Who may change a field (or open a form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Always,
    RoleIs(&'static str),
}

impl Access {
    pub fn allows(&self, session: &Session) -> bool {
        match self {
            Access::Always => true,
            Access::RoleIs(role) => session.has_role(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub validator: Validator,
    pub access: Access,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, validator: Validator) -> Self {
        Self {
            name,
            label,
            validator,
            access: Access::Always,
        }
    }

    fn restricted(mut self, access: Access) -> Self {
        self.access = access;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub name: &'static str,
    pub open: Access,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    spec: FormSpec,
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormState {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            values: BTreeMap::new(),
        }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn can_open(&self, session: &Session) -> bool {
        self.spec.open.allows(session)
    }

    pub fn editable(&self, field: &str, session: &Session) -> bool {
        self.spec
            .field(field)
            .is_some_and(|spec| self.can_open(session) && spec.access.allows(session))
    }

    /// Sets a field on behalf of `session`, refusing fields its role may not edit.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>, session: &Session) -> Result<(), ClientError> {
        let spec = self
            .spec
            .field(field)
            .ok_or_else(|| ClientError::validation(field, "Unknown field"))?;
        if !self.can_open(session) || !spec.access.allows(session) {
            return Err(ClientError::FieldNotEditable(field.to_string()));
        }
        self.values.insert(spec.name, value.into());
        Ok(())
    }

    /// Seeds a value without access checks (initial data of an update form).
    fn prefill(&mut self, field: &'static str, value: impl Into<FieldValue>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> &str {
        self.value(field).and_then(FieldValue::as_text).unwrap_or_default()
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        match self.value(field) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(text)) => split_list(text),
            None => Vec::new(),
        }
    }

    /// Checks fields in declaration order and reports the first invalid one.
    pub fn validate(&self) -> Result<(), ClientError> {
        for field in &self.spec.fields {
            let value = self.values.get(field.name);
            let blank = value.map_or(true, FieldValue::is_blank);
            let text = value.and_then(FieldValue::as_text).map(str::trim).unwrap_or_default();

            if field.validator == Validator::Optional {
                continue;
            }
            if blank {
                return Err(ClientError::validation(field.name, format!("{} is required", field.label)));
            }

            match field.validator {
                Validator::Required | Validator::Optional => {}
                Validator::Email => {
                    if !looks_like_email(text) {
                        return Err(ClientError::validation(field.name, "Invalid email address"));
                    }
                }
                Validator::OneOf(allowed) => {
                    if !allowed.contains(&text) {
                        return Err(ClientError::validation(
                            field.name,
                            format!("{} must be one of: {}", field.label, allowed.join(", ")),
                        ));
                    }
                }
                Validator::Date => {
                    if parse_date(text).is_none() {
                        return Err(ClientError::validation(field.name, format!("{} is not a valid date", field.label)));
                    }
                }
                Validator::Integer => {
                    if text.parse::<i64>().is_err() {
                        return Err(ClientError::validation(field.name, format!("{} must be a number", field.label)));
                    }
                }
            }
        }
        Ok(())
    }
}

fn looks_like_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts `yyyy-mm-dd` and the date picker's `dd-mm-yyyy`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d-%m-%Y"))
        .ok()
}

pub fn login_form() -> FormSpec {
    // Only presence is checked here; the server owns the real credential rules.
    FormSpec {
        name: "login",
        open: Access::Always,
        fields: vec![
            FieldSpec::new("email", "Email", Validator::Required),
            FieldSpec::new("password", "Password", Validator::Required),
        ],
    }
}

pub fn task_create_form() -> FormSpec {
    FormSpec {
        name: "task_create",
        open: Access::RoleIs(PM_ROLE),
        fields: task_fields(),
    }
}

/// Everyone may update status and description; the rest is PM-only.
pub fn task_update_form() -> FormSpec {
    let pm = Access::RoleIs(PM_ROLE);
    FormSpec {
        name: "task_update",
        open: Access::Always,
        fields: task_fields()
            .into_iter()
            .map(|field| match field.name {
                "description" | "status" => field,
                _ => field.restricted(pm),
            })
            .collect(),
    }
}

fn task_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("title", "Title", Validator::Required),
        FieldSpec::new("description", "Description", Validator::Required),
        FieldSpec::new("status", "Status", Validator::OneOf(STATUS_VALUES)),
        FieldSpec::new("contributors", "Contributors", Validator::Optional),
        FieldSpec::new("startDate", "Start date", Validator::Date),
        FieldSpec::new("endDate", "End date", Validator::Date),
    ]
}

pub fn user_create_form() -> FormSpec {
    FormSpec {
        name: "user_create",
        open: Access::Always,
        fields: vec![
            FieldSpec::new("email", "Email", Validator::Email),
            FieldSpec::new("username", "Username", Validator::Required),
            FieldSpec::new("password", "Password", Validator::Required),
            FieldSpec::new("roleId", "Role", Validator::Integer),
        ],
    }
}

pub fn user_update_form() -> FormSpec {
    FormSpec {
        name: "user_update",
        open: Access::Always,
        fields: vec![
            FieldSpec::new("email", "Email", Validator::Email),
            FieldSpec::new("username", "Username", Validator::Required),
            FieldSpec::new("password", "Password", Validator::Optional),
            FieldSpec::new("roleId", "Role", Validator::Integer),
        ],
    }
}

/// Update form seeded with the task's current values.
pub fn task_update_state(task: &Task) -> FormState {
    let mut state = FormState::new(task_update_form());
    state.prefill("title", task.title.as_str());
    state.prefill("description", task.description.as_str());
    state.prefill("status", task.status.as_str());
    state.prefill("contributors", task.contributors.clone());
    if let Some(start) = task.start_date {
        state.prefill("startDate", start.format("%Y-%m-%d").to_string());
    }
    if let Some(end) = task.end_date {
        state.prefill("endDate", end.format("%Y-%m-%d").to_string());
    }
    state
}

pub fn user_update_state(user: &User) -> FormState {
    let mut state = FormState::new(user_update_form());
    state.prefill("email", user.email.as_str());
    state.prefill("username", user.username.as_str());
    if let Some(role_id) = user.role_id {
        state.prefill("roleId", role_id.to_string());
    }
    state
}

pub fn task_draft(state: &FormState) -> Result<TaskDraft, ClientError> {
    state.validate()?;

    let date = |field: &str| {
        parse_date(state.text(field).trim()).ok_or_else(|| ClientError::validation(field, "Invalid date"))
    };
    let start_date = date("startDate")?;
    let end_date = date("endDate")?;
    if end_date < start_date {
        return Err(ClientError::validation("endDate", "End date must not be before start date"));
    }

    let status = TaskStatus::parse(state.text("status").trim())
        .ok_or_else(|| ClientError::validation("status", "Unknown status"))?;

    Ok(TaskDraft {
        title: state.text("title").trim().to_string(),
        description: state.text("description").trim().to_string(),
        status,
        contributors: state.list("contributors"),
        start_date,
        end_date,
    })
}

pub fn user_draft(state: &FormState) -> Result<UserDraft, ClientError> {
    state.validate()?;

    let role_id = state
        .text("roleId")
        .trim()
        .parse()
        .map_err(|_| ClientError::validation("roleId", "Role must be a number"))?;
    let password = Some(state.text("password").to_string()).filter(|p| !p.is_empty());

    Ok(UserDraft {
        email: state.text("email").trim().to_string(),
        username: state.text("username").trim().to_string(),
        password,
        role_id,
    })
}
