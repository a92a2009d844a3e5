//! Form state for the login, signup and station overlays.
//!
//! Forms hold raw text as typed. Validation turns them into the request
//! types from `chargemap-core`, so nothing half-parsed reaches the caches.

use chargemap_core::{ConnectorType, Location, SignupForm, Station, StationFields, StationStatus};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for the email / username inputs.
const MAX_TEXT_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for numeric inputs (power, latitude, longitude).
const MAX_NUMBER_LENGTH: usize = 16;

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a text character should be accepted
pub fn can_add_text_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TEXT_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Numeric fields take digits, one leading minus and a decimal point.
pub fn can_add_number_char(current: &str, c: char) -> bool {
    if current.chars().count() >= MAX_NUMBER_LENGTH {
        return false;
    }
    match c {
        '0'..='9' => true,
        '-' => current.is_empty(),
        '.' => !current.contains('.'),
        _ => false,
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

// ============================================================================
// Signup
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Username,
    FullName,
    Email,
    Password,
    ConfirmPassword,
    Button,
}

impl SignupFocus {
    const ORDER: [SignupFocus; 6] = [
        SignupFocus::Username,
        SignupFocus::FullName,
        SignupFocus::Email,
        SignupFocus::Password,
        SignupFocus::ConfirmPassword,
        SignupFocus::Button,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, SignupFocus::Password | SignupFocus::ConfirmPassword)
    }
}

/// Text buffer of the signup form that currently has focus.
pub fn signup_field_mut(form: &mut SignupForm, focus: SignupFocus) -> Option<&mut String> {
    match focus {
        SignupFocus::Username => Some(&mut form.username),
        SignupFocus::FullName => Some(&mut form.full_name),
        SignupFocus::Email => Some(&mut form.email),
        SignupFocus::Password => Some(&mut form.password),
        SignupFocus::ConfirmPassword => Some(&mut form.confirm_password),
        SignupFocus::Button => None,
    }
}

/// Every signup field must be filled in before a request goes out.
pub fn check_signup(form: &SignupForm) -> Result<(), String> {
    let required = [
        ("Username", &form.username),
        ("Full name", &form.full_name),
        ("Email", &form.email),
        ("Password", &form.password),
        ("Confirm password", &form.confirm_password),
    ];
    match required.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((label, _)) => Err(format!("{} is required", label)),
        None => Ok(()),
    }
}

// ============================================================================
// Station
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationField {
    Name,
    Status,
    Power,
    Connector,
    Latitude,
    Longitude,
    Submit,
}

impl StationField {
    const ORDER: [StationField; 7] = [
        StationField::Name,
        StationField::Status,
        StationField::Power,
        StationField::Connector,
        StationField::Latitude,
        StationField::Longitude,
        StationField::Submit,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationField::Name => "Name",
            StationField::Status => "Status",
            StationField::Power => "Power (kW)",
            StationField::Connector => "Connector",
            StationField::Latitude => "Latitude",
            StationField::Longitude => "Longitude",
            StationField::Submit => "",
        }
    }

    /// Fields edited by cycling through a fixed set of choices.
    pub fn is_choice(&self) -> bool {
        matches!(self, StationField::Status | StationField::Connector)
    }
}

/// Step through `choices`, treating `None` as the slot before the first one.
pub fn cycle_option<T: Copy + PartialEq>(current: Option<T>, choices: &[T], forward: bool) -> Option<T> {
    let len = choices.len();
    if len == 0 {
        return None;
    }
    let pos = current.and_then(|c| choices.iter().position(|x| *x == c));
    // None sits at index `len` in a ring of `len + 1` slots.
    let slot = pos.unwrap_or(len);
    let next = if forward {
        (slot + 1) % (len + 1)
    } else {
        (slot + len) % (len + 1)
    };
    choices.get(next).copied()
}

/// The add/edit station overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct StationForm {
    /// `Some` when editing an existing station.
    pub editing_id: Option<String>,
    pub name: String,
    pub status: Option<StationStatus>,
    pub power: String,
    pub connector: Option<ConnectorType>,
    pub latitude: String,
    pub longitude: String,
    pub focus: StationField,
    pub error: Option<String>,
}

impl Default for StationForm {
    fn default() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            status: None,
            power: String::new(),
            connector: None,
            latitude: String::new(),
            longitude: String::new(),
            focus: StationField::Name,
            error: None,
        }
    }
}

impl StationForm {
    /// A form prefilled from an existing station.
    pub fn edit(station: &Station) -> Self {
        Self {
            editing_id: Some(station.id.clone()),
            name: station.name.clone(),
            status: Some(station.status),
            power: station.power_output.to_string(),
            connector: Some(station.connector_type),
            latitude: station.location.latitude.to_string(),
            longitude: station.location.longitude.to_string(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit Charger"
        } else {
            "Add New Charger"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Update"
        } else {
            "Add"
        }
    }

    /// Text buffer of the focused field, if it is a text field.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            StationField::Name => Some(&mut self.name),
            StationField::Power => Some(&mut self.power),
            StationField::Latitude => Some(&mut self.latitude),
            StationField::Longitude => Some(&mut self.longitude),
            StationField::Status | StationField::Connector | StationField::Submit => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let numeric = matches!(
            self.focus,
            StationField::Power | StationField::Latitude | StationField::Longitude
        );
        let Some(buffer) = self.text_mut() else {
            return;
        };
        let accepted = if numeric {
            can_add_number_char(buffer, c)
        } else {
            can_add_text_char(buffer.chars().count(), c)
        };
        if accepted {
            buffer.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buffer) = self.text_mut() {
            buffer.pop();
        }
    }

    /// Cycle the focused choice field.
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            StationField::Status => {
                self.status = cycle_option(self.status, &StationStatus::ALL, forward);
            }
            StationField::Connector => {
                self.connector = cycle_option(self.connector, &ConnectorType::ALL, forward);
            }
            _ => {}
        }
    }

    /// Check every field and build the request body.
    pub fn validate(&self) -> Result<StationFields, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let status = self.status.ok_or_else(|| "Status is required".to_string())?;
        let power_output = parse_required(&self.power, "Power output")?;
        if power_output <= 0.0 {
            return Err("Power output must be positive".to_string());
        }
        let connector_type = self
            .connector
            .ok_or_else(|| "Connector type is required".to_string())?;
        let latitude = parse_required(&self.latitude, "Latitude")?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90".to_string());
        }
        let longitude = parse_required(&self.longitude, "Longitude")?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180".to_string());
        }

        Ok(StationFields {
            name: name.to_string(),
            status,
            power_output,
            connector_type,
            location: Location::new(latitude, longitude),
        })
    }
}

fn parse_required(input: &str, label: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required", label));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{} must be a number", label))
}

// ============================================================================
// Tests
// ============================================================================
