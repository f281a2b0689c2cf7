use serde::{Deserialize, Serialize};

/// A Northwind customer as served by either backend.
///
/// Serialized with the original PascalCase member names so existing JSON
/// and SOAP clients keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Short fixed-format identifier (e.g. `ALFKI`).
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "ContactName")]
    pub contact_name: Option<String>,
    /// Free-text country; the CSV path filters on it by substring.
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "Fax")]
    pub fax: Option<String>,
}

impl Customer {
    /// Creates a customer with only the required fields set.
    #[must_use]
    pub fn new(customer_id: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            company_name: company_name.into(),
            contact_name: None,
            country: None,
            phone: None,
            fax: None,
        }
    }

    #[must_use]
    pub fn with_contact(mut self, contact_name: impl Into<String>) -> Self {
        self.contact_name = Some(contact_name.into());
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_fax(mut self, fax: impl Into<String>) -> Self {
        self.fax = Some(fax.into());
        self
    }

    /// Contact name used as the CSV sort key; missing sorts as `""`.
    #[must_use]
    pub fn contact_sort_key(&self) -> &str {
        self.contact_name.as_deref().unwrap_or("")
    }
}
