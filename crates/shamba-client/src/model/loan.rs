use serde::{Deserialize, Serialize};

/// Micro-loan offer computed by the backend from the user's trading history.
///
/// `interest_rate` is a monthly percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub max_loan_amount: f64,
    pub interest_rate: f64,
    #[serde(default)]
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_terms_parse_backend_payload() {
        let json = r#"{
            "maxLoanAmount": 15000,
            "interestRate": 2.5,
            "explanation": "Steady monthly sales of maize."
        }"#;
        let terms: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(terms.max_loan_amount, 15000.0);
        assert_eq!(terms.interest_rate, 2.5);
        assert_eq!(terms.explanation, "Steady monthly sales of maize.");
    }
}
