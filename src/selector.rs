//! Resolution of the target contract
//!
//! Explicit customer/contract numbers must match exactly. What happens when
//! one is omitted is decided by a [`SelectionPolicy`]; the default picks the
//! first customer and the first open electricity contract.

use crate::config::SelectionConfig;
use crate::error::{EnovosError, Result};
use crate::portal::{Contract, Customer, KIND_ELECTRICITY, User};

/// Defaulting rules for omitted selection values
pub trait SelectionPolicy {
    fn pick_customer<'c, 'a>(&self, customers: &'c [Customer<'a>]) -> Option<&'c Customer<'a>>;

    fn pick_contract<'c, 'a>(&self, contracts: &'c [Contract<'a>]) -> Option<&'c Contract<'a>>;

    /// Human description of the default contract, used in not-found errors
    fn contract_description(&self) -> &'static str;
}

/// First customer in portal order, first open electricity contract
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOpenElectricity;

impl SelectionPolicy for FirstOpenElectricity {
    fn pick_customer<'c, 'a>(&self, customers: &'c [Customer<'a>]) -> Option<&'c Customer<'a>> {
        customers.first()
    }

    fn pick_contract<'c, 'a>(&self, contracts: &'c [Contract<'a>]) -> Option<&'c Contract<'a>> {
        contracts
            .iter()
            .find(|c| c.is_open() && c.kind() == KIND_ELECTRICITY)
    }

    fn contract_description(&self) -> &'static str {
        "open Electricity contract"
    }
}

/// Requested customer/contract; `None` means "use the policy"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub customer_nr: Option<String>,
    pub contract_nr: Option<String>,
}

impl From<&SelectionConfig> for Selection {
    fn from(cfg: &SelectionConfig) -> Self {
        Self {
            customer_nr: cfg.customer_nr.clone(),
            contract_nr: cfg.contract_nr.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selector<P = FirstOpenElectricity> {
    policy: P,
}

impl Selector<FirstOpenElectricity> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: SelectionPolicy> Selector<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn select_customer<'u, 'a>(
        &self,
        user: &'u User<'a>,
        customer_nr: Option<&str>,
    ) -> Result<&'u Customer<'a>> {
        match customer_nr {
            Some(nr) => user.customer_by_nr(nr)?.ok_or_else(|| {
                EnovosError::not_found("customer", format!("no customer with number {}", nr))
            }),
            None => self
                .policy
                .pick_customer(user.customers()?)
                .ok_or_else(|| EnovosError::not_found("customer", "user has no customers")),
        }
    }

    pub fn select_contract<'c, 'a>(
        &self,
        customer: &'c Customer<'a>,
        contract_nr: Option<&str>,
    ) -> Result<&'c Contract<'a>> {
        match contract_nr {
            Some(nr) => customer.contract_by_nr(nr)?.ok_or_else(|| {
                EnovosError::not_found(
                    "contract",
                    format!(
                        "no contract {} for customer {}",
                        nr,
                        customer.customer_nr()
                    ),
                )
            }),
            None => self
                .policy
                .pick_contract(customer.contracts()?)
                .ok_or_else(|| {
                    EnovosError::not_found(
                        "contract",
                        format!(
                            "customer {} has no {}",
                            customer.customer_nr(),
                            self.policy.contract_description()
                        ),
                    )
                }),
        }
    }

    /// Customer first, then contract
    pub fn select<'u, 'a>(
        &self,
        user: &'u User<'a>,
        selection: &Selection,
    ) -> Result<&'u Contract<'a>> {
        let customer = self.select_customer(user, selection.customer_nr.as_deref())?;
        self.select_contract(customer, selection.contract_nr.as_deref())
    }
}
