// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Parameter sets for the ASSIST articulation queries.
//!
//! Typed structs are used by library callers; the `*Params` query shapes are
//! what the HTTP front end extracts from incoming requests. The latter keep raw
//! strings so that validation happens in one place, the endpoint catalog.

use serde::{Deserialize, Serialize};

use crate::catalog::{param, FetchRequest, Operation};

/// Institution pair and academic year shared by the category and agreement
/// listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementQuery {
    pub receiving_institution_id: u64,
    pub sending_institution_id: u64,
    pub academic_year_id: u64,
}

impl AgreementQuery {
    pub fn new(
        receiving_institution_id: u64,
        sending_institution_id: u64,
        academic_year_id: u64,
    ) -> Self {
        Self {
            receiving_institution_id,
            sending_institution_id,
            academic_year_id,
        }
    }
}

/// Query string of `GET /api/agreements_categories`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesParams {
    #[serde(default, rename = "receivingInstitutionId", alias = "receiving_institution_id")]
    pub receiving_institution_id: Option<String>,
    #[serde(default, rename = "sendingInstitutionId", alias = "sending_institution_id")]
    pub sending_institution_id: Option<String>,
    #[serde(default, rename = "academicYearId", alias = "academic_year_id")]
    pub academic_year_id: Option<String>,
}

/// Query string of `GET /api/agreements`.
#[derive(Debug, Default, Deserialize)]
pub struct AgreementsParams {
    #[serde(default, rename = "receivingInstitutionId", alias = "receiving_institution_id")]
    pub receiving_institution_id: Option<String>,
    #[serde(default, rename = "sendingInstitutionId", alias = "sending_institution_id")]
    pub sending_institution_id: Option<String>,
    #[serde(default, rename = "academicYearId", alias = "academic_year_id")]
    pub academic_year_id: Option<String>,
    #[serde(default, rename = "categoryCode", alias = "category_code")]
    pub category_code: Option<String>,
}

impl From<CategoriesParams> for FetchRequest {
    fn from(params: CategoriesParams) -> Self {
        FetchRequest::new(Operation::AgreementCategories)
            .with_optional(param::RECEIVING_INSTITUTION_ID, params.receiving_institution_id)
            .with_optional(param::SENDING_INSTITUTION_ID, params.sending_institution_id)
            .with_optional(param::ACADEMIC_YEAR_ID, params.academic_year_id)
    }
}

impl From<AgreementsParams> for FetchRequest {
    fn from(params: AgreementsParams) -> Self {
        FetchRequest::new(Operation::Agreements)
            .with_optional(param::RECEIVING_INSTITUTION_ID, params.receiving_institution_id)
            .with_optional(param::SENDING_INSTITUTION_ID, params.sending_institution_id)
            .with_optional(param::ACADEMIC_YEAR_ID, params.academic_year_id)
            .with_optional(param::CATEGORY_CODE, params.category_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_query_uses_camel_case_on_the_wire() {
        let query = AgreementQuery::new(1, 2, 74);
        let json = serde_json::to_value(query).unwrap();
        assert_eq!(json["receivingInstitutionId"], 1);
        assert_eq!(json["sendingInstitutionId"], 2);
        assert_eq!(json["academicYearId"], 74);
    }

    #[test]
    fn agreements_params_accept_snake_case_aliases() {
        let params: AgreementsParams = serde_json::from_str(
            r#"{"receiving_institution_id":"1","sendingInstitutionId":"2","academic_year_id":"74","categoryCode":"major"}"#,
        )
        .unwrap();

        let request = FetchRequest::from(params);
        assert_eq!(request.operation(), Operation::Agreements);
        assert_eq!(request.get(param::RECEIVING_INSTITUTION_ID), Some("1"));
        assert_eq!(request.get(param::SENDING_INSTITUTION_ID), Some("2"));
        assert_eq!(request.get(param::ACADEMIC_YEAR_ID), Some("74"));
        assert_eq!(request.get(param::CATEGORY_CODE), Some("major"));
    }

    #[test]
    fn missing_query_fields_are_left_out_of_the_request() {
        let request = FetchRequest::from(CategoriesParams {
            receiving_institution_id: Some("1".into()),
            ..CategoriesParams::default()
        });
        assert_eq!(request.get(param::RECEIVING_INSTITUTION_ID), Some("1"));
        assert_eq!(request.get(param::SENDING_INSTITUTION_ID), None);
    }
}
