//! Script execution.
//!
//! Arguments and results pass through as JSON; element handles cross the
//! boundary as `{"ELEMENT": id}` references (see
//! [`Element::reference`](crate::browser::Element::reference)).

use serde_json::Value;

use crate::error::Result;
use crate::protocol::Command;

use super::Driver;

// ============================================================================
// Driver - Script
// ============================================================================

impl Driver {
    /// Executes a synchronous script and returns its result.
    ///
    /// A script that returns nothing yields `Value::Null`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let sum = driver.execute("return arguments[0] + arguments[1];", vec![json!(1), json!(2)]).await?;
    /// assert_eq!(sum, json!(3));
    /// ```
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.logged("execute", script, async {
            Ok(self.dispatch(Command::execute(script, args)).await?.into_value())
        })
        .await
    }

    /// Executes a script that signals completion through its last argument.
    ///
    /// Bounded by the server-enforced script timeout.
    pub async fn execute_async(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.logged("execute_async", script, async {
            Ok(self
                .dispatch(Command::execute_async(script, args))
                .await?
                .into_value())
        })
        .await
    }
}
