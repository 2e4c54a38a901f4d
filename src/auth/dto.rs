use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::auth::repo_types::UserProfile;
use crate::auth::services::is_valid_email;
use crate::error::{ApiError, FieldErrors};

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    static ref LANGUAGE_RE: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

const EMAIL_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 100;
const AGE_MAX: i32 = 125;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Cm,
    Inch,
    Feet,
}

impl HeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Inch => "inch",
            HeightUnit::Feet => "feet",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Lbs,
    Kg,
    Stone,
}

impl WeightUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
            WeightUnit::Stone => "stone",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatPref {
    #[serde(rename = "YYYY-MM-DD")]
    Ymd,
    #[serde(rename = "MM-DD-YYYY")]
    Mdy,
    #[serde(rename = "DD-MM-YYYY")]
    Dmy,
}

impl DateFormatPref {
    pub fn as_str(self) -> &'static str {
        match self {
            DateFormatPref::Ymd => "YYYY-MM-DD",
            DateFormatPref::Mdy => "MM-DD-YYYY",
            DateFormatPref::Dmy => "DD-MM-YYYY",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Request body for `POST /create_user`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_link: Option<String>,
    #[serde(default)]
    pub premium: Option<bool>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub birthday: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub height_unit_pref: Option<HeightUnit>,
    #[serde(default)]
    pub weight_unit_pref: Option<WeightUnit>,
    #[serde(default)]
    pub date_format_pref: Option<DateFormatPref>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A registration request that passed validation.
#[derive(Debug)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub profile: UserProfile,
}

fn check_len(errors: &mut FieldErrors, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.add(
            field,
            format!("Length must be between {min} and {max} characters"),
        );
    }
}

fn check_token(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    (min, max): (usize, usize),
    re: &Regex,
    what: &str,
) {
    if let Some(v) = value {
        check_len(errors, field, v, min, max);
        if !re.is_match(v) {
            errors.add(field, format!("Must contain only {what}"));
        }
    }
}

impl CreateUserRequest {
    /// Normalizes the email and checks every supplied field, reporting all
    /// failures at once.
    pub fn validate(self) -> Result<NewAccount, ApiError> {
        let mut errors = FieldErrors::default();

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.add("email", "Not a valid email address");
        } else if email.len() > EMAIL_MAX {
            errors.add("email", format!("Must be at most {EMAIL_MAX} characters"));
        }

        check_len(
            &mut errors,
            "password",
            &self.password,
            PASSWORD_MIN,
            PASSWORD_MAX,
        );

        check_token(
            &mut errors,
            "username",
            &self.username,
            (8, 100),
            &USERNAME_RE,
            "letters and digits",
        );
        check_token(
            &mut errors,
            "first_name",
            &self.first_name,
            (3, 50),
            &NAME_RE,
            "letters and digits",
        );
        check_token(
            &mut errors,
            "last_name",
            &self.last_name,
            (3, 50),
            &NAME_RE,
            "letters and digits",
        );
        check_token(
            &mut errors,
            "language",
            &self.language,
            (2, 10),
            &LANGUAGE_RE,
            "letters",
        );

        if let Some(phone) = &self.phone_number {
            if !PHONE_RE.is_match(phone) {
                errors.add("phone_number", "Not a valid phone number");
            }
        }

        if let Some(age) = self.age {
            if !(0..=AGE_MAX).contains(&age) {
                errors.add("age", format!("Must be between 0 and {AGE_MAX}"));
            }
        }

        if let Some(link) = &self.profile_link {
            check_len(&mut errors, "profile_link", link, 1, 100);
        }

        let birthday = match &self.birthday {
            Some(raw) => match Date::parse(raw, format_description!("[year]-[month]-[day]")) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("birthday", "Must be a date formatted YYYY-MM-DD");
                    None
                }
            },
            None => None,
        };

        errors.into_result()?;

        Ok(NewAccount {
            email,
            password: self.password,
            profile: UserProfile {
                username: self.username,
                profile_link: self.profile_link,
                premium: self.premium.unwrap_or(false),
                age: self.age,
                birthday,
                first_name: self.first_name,
                last_name: self.last_name,
                gender: self.gender.map(Gender::as_str),
                phone_number: self.phone_number,
                height_unit_pref: self.height_unit_pref.map(HeightUnit::as_str),
                weight_unit_pref: self.weight_unit_pref.map(WeightUnit::as_str),
                date_format_pref: self.date_format_pref.map(DateFormatPref::as_str),
                language: self.language,
            },
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
