use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub company: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    /// Salutation-safe name for message bodies.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "customer"
        } else {
            name
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
}

impl Manager {
    /// A manager block is only rendered when a name was entered.
    pub fn is_present(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, Manager};

    #[test]
    fn display_name_falls_back_for_blank_names() {
        let customer = Customer { name: "  ".to_string(), ..Customer::default() };
        assert_eq!(customer.display_name(), "customer");

        let customer = Customer { name: "Jo Yun".to_string(), ..Customer::default() };
        assert_eq!(customer.display_name(), "Jo Yun");
    }

    #[test]
    fn manager_presence_requires_a_name() {
        let manager = Manager { position: "Account Lead".to_string(), ..Manager::default() };
        assert!(!manager.is_present());

        let manager = Manager { name: "Kim".to_string(), ..Manager::default() };
        assert!(manager.is_present());
    }
}
