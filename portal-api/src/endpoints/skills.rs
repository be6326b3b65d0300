use super::SkillId;
use crate::error::ValidationError;
use crate::request::{ApiRequest, EmptyResponse, RequestData};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SkillInput {
    pub fn new(name: impl Into<String>, category: Option<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::field("name", "must not be empty"));
        }
        Ok(Self { name, category })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListSkills;

impl ApiRequest for ListSkills {
    type Data = ();
    type Response = Vec<Skill>;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/skills".into()
    }
}

#[derive(Debug, Clone)]
pub struct CreateSkill {
    input: SkillInput,
}

impl CreateSkill {
    pub fn new(input: SkillInput) -> Self {
        Self { input }
    }
}

impl ApiRequest for CreateSkill {
    type Data = SkillInput;
    type Response = Skill;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/skills".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.input)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSkill {
    id: SkillId,
    input: SkillInput,
}

impl UpdateSkill {
    pub fn new(id: SkillId, input: SkillInput) -> Self {
        Self { id, input }
    }
}

impl ApiRequest for UpdateSkill {
    type Data = SkillInput;
    type Response = Skill;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/skills/{}", self.id).into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(&self.input)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteSkill {
    id: SkillId,
}

impl DeleteSkill {
    pub fn new(id: SkillId) -> Self {
        Self { id }
    }
}

impl ApiRequest for DeleteSkill {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/skills/{}", self.id).into()
    }
}
