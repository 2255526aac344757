//! Message schema of the `distribute` contract.
//!
//! Execute and query messages serialize as externally tagged snake_case
//! objects, e.g. `{"withdraw":{"receiver":"terra1..."}}`. Amounts are kept as
//! decimal strings exactly as the caller supplied them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    Deposit {},
    Withdraw { receiver: String },
    Set { amount: String },
    SetOwner { arbiter: String },
}

impl ExecuteMsg {
    /// Operation name as it appears on the wire.
    pub fn operation(&self) -> &'static str {
        match self {
            ExecuteMsg::Deposit {} => "deposit",
            ExecuteMsg::Withdraw { .. } => "withdraw",
            ExecuteMsg::Set { .. } => "set",
            ExecuteMsg::SetOwner { .. } => "set_owner",
        }
    }

    /// The body under the operation tag, taken from the serialized message
    /// so the wire format has a single definition.
    pub fn payload(&self) -> Value {
        // Plain string fields only; serializing cannot fail.
        match serde_json::to_value(self) {
            Ok(Value::Object(mut tagged)) => tagged
                .remove(self.operation())
                .unwrap_or_else(|| Value::Object(Map::new())),
            _ => Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Accounts {},
    Records {},
    Limit {},
}

/// Native funds attached to an execute call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub arbiter: String,
    pub burn: String,
    pub development: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub burn: String,
    pub jackpot: String,
    pub development: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitResponse {
    pub limit: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_matches_serialized_body() {
        let msgs = [
            ExecuteMsg::Deposit {},
            ExecuteMsg::Withdraw {
                receiver: "terra1abc".into(),
            },
            ExecuteMsg::Set {
                amount: "2000000".into(),
            },
            ExecuteMsg::SetOwner {
                arbiter: "terra1owner".into(),
            },
        ];
        for msg in msgs {
            let wire = serde_json::to_value(&msg).unwrap();
            assert_eq!(wire[msg.operation()], msg.payload());
        }
    }

    #[test]
    fn operation_is_the_serialized_tag() {
        let msgs = [
            ExecuteMsg::Deposit {},
            ExecuteMsg::Withdraw {
                receiver: "terra1abc".into(),
            },
            ExecuteMsg::Set {
                amount: "1".into(),
            },
            ExecuteMsg::SetOwner {
                arbiter: "terra1owner".into(),
            },
        ];
        for msg in msgs {
            let wire = serde_json::to_value(&msg).unwrap();
            let tags: Vec<&String> = wire.as_object().unwrap().keys().collect();
            assert_eq!(tags, vec![msg.operation()]);
        }
    }

    #[test]
    fn payload_bodies() {
        assert_eq!(ExecuteMsg::Deposit {}.payload(), json!({}));
        assert_eq!(
            ExecuteMsg::Withdraw {
                receiver: "terra1abc".into()
            }
            .payload(),
            json!({ "receiver": "terra1abc" })
        );
        assert_eq!(
            ExecuteMsg::SetOwner {
                arbiter: "terra1owner".into()
            }
            .payload(),
            json!({ "arbiter": "terra1owner" })
        );
    }

    #[test]
    fn deposit_serializes_empty_body() {
        let wire = serde_json::to_value(ExecuteMsg::Deposit {}).unwrap();
        assert_eq!(wire, json!({ "deposit": {} }));
    }

    #[test]
    fn set_owner_is_snake_case() {
        let wire = serde_json::to_value(ExecuteMsg::SetOwner {
            arbiter: "terra1x".into(),
        })
        .unwrap();
        assert_eq!(wire, json!({ "set_owner": { "arbiter": "terra1x" } }));
    }

    #[test]
    fn set_keeps_amount_verbatim() {
        let msg = ExecuteMsg::Set {
            amount: "two million".into(),
        };
        assert_eq!(msg.payload(), json!({ "amount": "two million" }));
    }

    #[test]
    fn query_messages_serialize_as_tags() {
        assert_eq!(
            serde_json::to_value(QueryMsg::Records {}).unwrap(),
            json!({ "records": {} })
        );
        assert_eq!(
            serde_json::to_value(QueryMsg::Limit {}).unwrap(),
            json!({ "limit": {} })
        );
    }

    #[test]
    fn records_response_decodes_uint128_strings() {
        let data = json!({ "burn": "850", "jackpot": "100", "development": "50" });
        let records: RecordsResponse = serde_json::from_value(data).unwrap();
        assert_eq!(records.jackpot, "100");
    }

    #[test]
    fn accounts_response_decodes() {
        let data = json!({
            "arbiter": "terra1arb",
            "burn": "terra1burn",
            "development": "terra1dev",
            "amount": "2000000"
        });
        let accounts: AccountsResponse = serde_json::from_value(data).unwrap();
        assert_eq!(accounts.arbiter, "terra1arb");
        assert_eq!(accounts.amount, "2000000");
    }
}
