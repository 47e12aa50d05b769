// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Endpoint catalog for the ASSIST articulation API.
//!
//! Maps each logical operation onto the remote URL it is served from and
//! validates the parameters that URL needs. Pure URL construction: nothing in
//! here touches the network.

use std::collections::HashMap;
use std::fmt;

use reqwest::Url;
use url::form_urlencoded;

use crate::config::DEFAULT_BASE_URL;
use crate::error::ScrapeError;
use crate::model::AgreementQuery;

/// Parameter names as the remote API spells them.
pub mod param {
    pub const INSTITUTION_ID: &str = "institutionId";
    pub const RECEIVING_INSTITUTION_ID: &str = "receivingInstitutionId";
    pub const SENDING_INSTITUTION_ID: &str = "sendingInstitutionId";
    pub const ACADEMIC_YEAR_ID: &str = "academicYearId";
    pub const CATEGORY_CODE: &str = "categoryCode";
    pub const KEY: &str = "key";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

const fn integer(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Integer,
    }
}

const fn text(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Text,
    }
}

const INSTITUTION_AGREEMENTS_PARAMS: &[ParamSpec] = &[integer(param::INSTITUTION_ID)];

const AGREEMENT_CATEGORIES_PARAMS: &[ParamSpec] = &[
    integer(param::RECEIVING_INSTITUTION_ID),
    integer(param::SENDING_INSTITUTION_ID),
    integer(param::ACADEMIC_YEAR_ID),
];

const AGREEMENTS_PARAMS: &[ParamSpec] = &[
    integer(param::RECEIVING_INSTITUTION_ID),
    integer(param::SENDING_INSTITUTION_ID),
    integer(param::ACADEMIC_YEAR_ID),
    text(param::CATEGORY_CODE),
];

const ARTICULATION_AGREEMENT_PARAMS: &[ParamSpec] = &[text(param::KEY)];

/// The four remote queries the scraper knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InstitutionAgreements,
    AgreementCategories,
    Agreements,
    ArticulationAgreement,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::InstitutionAgreements,
        Operation::AgreementCategories,
        Operation::Agreements,
        Operation::ArticulationAgreement,
    ];

    /// Stable name used in logs, metrics labels and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Operation::InstitutionAgreements => "institution_agreements",
            Operation::AgreementCategories => "agreements_categories",
            Operation::Agreements => "agreements",
            Operation::ArticulationAgreement => "articulation_agreements",
        }
    }

    pub fn required_parameters(self) -> &'static [ParamSpec] {
        match self {
            Operation::InstitutionAgreements => INSTITUTION_AGREEMENTS_PARAMS,
            Operation::AgreementCategories => AGREEMENT_CATEGORIES_PARAMS,
            Operation::Agreements => AGREEMENTS_PARAMS,
            Operation::ArticulationAgreement => ARTICULATION_AGREEMENT_PARAMS,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One logical fetch: an operation plus its named parameters.
///
/// Parameters the operation does not declare are carried but ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    operation: Operation,
    parameters: HashMap<String, String>,
}

impl FetchRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            parameters: HashMap::new(),
        }
    }

    pub fn with<N: Into<String>, V: ToString>(mut self, name: N, value: V) -> Self {
        self.parameters.insert(name.into(), value.to_string());
        self
    }

    pub fn with_optional<N: Into<String>>(self, name: N, value: Option<String>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn institution_agreements(institution_id: u64) -> Self {
        Self::new(Operation::InstitutionAgreements).with(param::INSTITUTION_ID, institution_id)
    }

    pub fn agreement_categories(query: &AgreementQuery) -> Self {
        Self::new(Operation::AgreementCategories)
            .with(param::RECEIVING_INSTITUTION_ID, query.receiving_institution_id)
            .with(param::SENDING_INSTITUTION_ID, query.sending_institution_id)
            .with(param::ACADEMIC_YEAR_ID, query.academic_year_id)
    }

    pub fn agreements(query: &AgreementQuery, category_code: &str) -> Self {
        Self::new(Operation::Agreements)
            .with(param::RECEIVING_INSTITUTION_ID, query.receiving_institution_id)
            .with(param::SENDING_INSTITUTION_ID, query.sending_institution_id)
            .with(param::ACADEMIC_YEAR_ID, query.academic_year_id)
            .with(param::CATEGORY_CODE, category_code)
    }

    pub fn articulation_agreement(key: &str) -> Self {
        Self::new(Operation::ArticulationAgreement).with(param::KEY, key)
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

/// Resolves [`FetchRequest`]s against a fixed base URL.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    base: Url,
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

impl EndpointCatalog {
    pub fn new(base_url: &str) -> Result<Self, ScrapeError> {
        let mut base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ScrapeError::invalid_parameter("base_url", e.to_string()))?;

        if base.cannot_be_a_base() {
            return Err(ScrapeError::invalid_parameter(
                "base_url",
                format!("`{base_url}` cannot carry path segments"),
            ));
        }

        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Validate the request's parameters and build the remote URL.
    ///
    /// Integer parameters are written in canonical form: `" 42 "`, `"042"`
    /// and `"+42"` all become `42`. Text parameters are carried unchanged and
    /// decode back to the exact input.
    pub fn resolve(&self, request: &FetchRequest) -> Result<Url, ScrapeError> {
        let values = validate(request)?;
        let value = |name: &str| {
            values
                .iter()
                .find(|(spec_name, _)| *spec_name == name)
                .map(|(_, value)| value.as_str())
                .unwrap_or_default()
        };

        let url = match request.operation() {
            Operation::InstitutionAgreements => {
                self.join(&["institutions", value(param::INSTITUTION_ID), "agreements"])
            }
            Operation::AgreementCategories => {
                let mut url = self.join(&["agreements", "categories"]);
                url.query_pairs_mut().extend_pairs(values.iter().map(|(k, v)| (*k, v)));
                url
            }
            Operation::Agreements => {
                let mut url = self.join(&["agreements"]);
                url.query_pairs_mut().extend_pairs(values.iter().map(|(k, v)| (*k, v)));
                url
            }
            Operation::ArticulationAgreement => {
                let mut url = self.join(&["articulation", "Agreements"]);
                url.set_query(Some(&format!("Key={}", encode_key(value(param::KEY)))));
                url
            }
        };

        Ok(url)
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Form-encode an articulation key but leave its `/` and `=` separators raw,
/// so `A/B=C` goes out as `Key=A/B=C` while `&`, `+` and `%` stay part of the
/// value.
fn encode_key(key: &str) -> String {
    form_urlencoded::byte_serialize(key.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
        .replace("%3D", "=")
}

/// Check every declared parameter and return them in declaration order.
/// Integer values come back normalized (trimmed, no leading zeros).
fn validate(request: &FetchRequest) -> Result<Vec<(&'static str, String)>, ScrapeError> {
    request
        .operation()
        .required_parameters()
        .iter()
        .map(|spec| -> Result<(&'static str, String), ScrapeError> {
            let raw = request
                .get(spec.name)
                .ok_or_else(|| ScrapeError::invalid_parameter(spec.name, "is required"))?;

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ScrapeError::invalid_parameter(spec.name, "must not be empty"));
            }

            let value = match spec.kind {
                ParamKind::Integer => trimmed
                    .parse::<u64>()
                    .map_err(|_| {
                        ScrapeError::invalid_parameter(
                            spec.name,
                            format!("must be a non-negative integer, got `{trimmed}`"),
                        )
                    })?
                    .to_string(),
                ParamKind::Text => raw.to_string(),
            };

            Ok((spec.name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EndpointCatalog {
        EndpointCatalog::default()
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    fn full_request(operation: Operation) -> FetchRequest {
        match operation {
            Operation::InstitutionAgreements => FetchRequest::institution_agreements(1),
            Operation::AgreementCategories => {
                FetchRequest::agreement_categories(&AgreementQuery::new(1, 2, 3))
            }
            Operation::Agreements => {
                FetchRequest::agreements(&AgreementQuery::new(1, 2, 3), "major")
            }
            Operation::ArticulationAgreement => FetchRequest::articulation_agreement("a/b"),
        }
    }

    #[test]
    fn institution_agreements_embeds_id_in_path() {
        let url = catalog()
            .resolve(&FetchRequest::institution_agreements(113))
            .unwrap();
        assert_eq!(url.as_str(), "https://assist.org/api/institutions/113/agreements");
    }

    #[test]
    fn agreement_categories_uses_query_string() {
        let url = catalog()
            .resolve(&FetchRequest::agreement_categories(&AgreementQuery::new(79, 113, 74)))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://assist.org/api/agreements/categories?receivingInstitutionId=79&sendingInstitutionId=113&academicYearId=74"
        );
    }

    #[test]
    fn agreements_round_trips_every_parameter() {
        let url = catalog()
            .resolve(&FetchRequest::agreements(&AgreementQuery::new(79, 113, 74), "dept"))
            .unwrap();
        assert_eq!(url.path(), "/api/agreements");
        assert_eq!(query_value(&url, param::RECEIVING_INSTITUTION_ID).as_deref(), Some("79"));
        assert_eq!(query_value(&url, param::SENDING_INSTITUTION_ID).as_deref(), Some("113"));
        assert_eq!(query_value(&url, param::ACADEMIC_YEAR_ID).as_deref(), Some("74"));
        assert_eq!(query_value(&url, param::CATEGORY_CODE).as_deref(), Some("dept"));
    }

    #[test]
    fn category_code_is_escaped_and_recoverable() {
        let url = catalog()
            .resolve(&FetchRequest::agreements(&AgreementQuery::new(1, 2, 3), "a&b c"))
            .unwrap();
        assert_eq!(query_value(&url, param::CATEGORY_CODE).as_deref(), Some("a&b c"));
    }

    #[test]
    fn articulation_key_keeps_separators_unescaped() {
        let url = catalog()
            .resolve(&FetchRequest::articulation_agreement("A/B=C"))
            .unwrap();
        assert_eq!(url.as_str(), "https://assist.org/api/articulation/Agreements?Key=A/B=C");
        assert_eq!(query_value(&url, "Key").as_deref(), Some("A/B=C"));
    }

    #[test]
    fn articulation_key_query_metacharacters_round_trip() {
        for key in ["A&B", "A+B", "A%2FB", "A#B", "A B", "x/y=z&Key=w"] {
            let url = catalog()
                .resolve(&FetchRequest::articulation_agreement(key))
                .unwrap();
            assert_eq!(query_value(&url, "Key").as_deref(), Some(key), "url: {url}");
            assert_eq!(url.query_pairs().count(), 1, "url: {url}");
        }
    }

    #[test]
    fn articulation_key_escapes_only_what_it_must() {
        let url = catalog()
            .resolve(&FetchRequest::articulation_agreement("A&B+C%D/E=F"))
            .unwrap();
        assert_eq!(url.query(), Some("Key=A%26B%2BC%25D/E=F"));
    }

    #[test]
    fn articulation_key_with_many_segments() {
        let key = "75/113/to/136/Major/fc50cabb-4d0c-4ad4-8b71-ba1e1d8e8a41";
        let url = catalog()
            .resolve(&FetchRequest::articulation_agreement(key))
            .unwrap();
        assert_eq!(url.query(), Some(format!("Key={key}").as_str()));
    }

    #[test]
    fn missing_parameters_are_rejected_for_every_operation() {
        for operation in Operation::ALL {
            for spec in operation.required_parameters() {
                let mut request = full_request(operation);
                request.parameters.remove(spec.name);

                let err = catalog().resolve(&request).unwrap_err();
                match err {
                    ScrapeError::InvalidParameter { name, .. } => assert_eq!(name, spec.name),
                    other => panic!("expected InvalidParameter for {operation}, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn empty_parameters_are_rejected() {
        let err = catalog()
            .resolve(&FetchRequest::articulation_agreement("   "))
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidParameter { ref name, .. } if name == "key"));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        let request = FetchRequest::new(Operation::InstitutionAgreements)
            .with(param::INSTITUTION_ID, "abc");
        let err = catalog().resolve(&request).unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));

        let negative = FetchRequest::new(Operation::InstitutionAgreements)
            .with(param::INSTITUTION_ID, "-4");
        assert!(catalog().resolve(&negative).is_err());
    }

    #[test]
    fn integer_values_are_trimmed() {
        let request = FetchRequest::new(Operation::InstitutionAgreements)
            .with(param::INSTITUTION_ID, " 42 ");
        let url = catalog().resolve(&request).unwrap();
        assert_eq!(url.path(), "/api/institutions/42/agreements");

        for raw in ["007", "+7"] {
            let request = FetchRequest::new(Operation::InstitutionAgreements)
                .with(param::INSTITUTION_ID, raw);
            let url = catalog().resolve(&request).unwrap();
            assert_eq!(url.path(), "/api/institutions/7/agreements");
        }
    }

    #[test]
    fn extra_parameters_are_ignored() {
        let request = FetchRequest::institution_agreements(7).with("unused", "value");
        let url = catalog().resolve(&request).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn custom_base_url_keeps_its_path_prefix() {
        let catalog = EndpointCatalog::new("http://127.0.0.1:9000/proxy/api/").unwrap();
        let url = catalog
            .resolve(&FetchRequest::institution_agreements(1))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/proxy/api/institutions/1/agreements");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(EndpointCatalog::new("not a url").is_err());
        assert!(EndpointCatalog::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn operation_names_are_stable() {
        let names: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(
            names,
            [
                "institution_agreements",
                "agreements_categories",
                "agreements",
                "articulation_agreements"
            ]
        );
    }
}
