//! Payment collection at the terminal.
//!
//! Prints what a gateway checkout widget would be opened with, then reads
//! the callback values back from stdin. A blank payment id means the user
//! closed the widget. Prompts go to stderr so `--json` output stays parseable.

use async_trait::async_trait;
use shopfront_client::{PaymentContext, PaymentOutcome, PaymentProvider};
use shopfront_core::{PaymentIntent, PaymentVerification};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

type Input = Box<dyn AsyncBufRead + Send + Unpin>;
type Prompts = Box<dyn AsyncWrite + Send + Unpin>;

/// A [`PaymentProvider`] that prompts on the terminal.
pub struct ConsolePaymentProvider {
    input: Mutex<Input>,
    prompts: Mutex<Prompts>,
}

impl Default for ConsolePaymentProvider {
    fn default() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }
}

impl ConsolePaymentProvider {
    /// Read callback values from `input` and write prompts to `prompts`.
    pub fn new(
        input: impl AsyncBufRead + Send + Unpin + 'static,
        prompts: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            prompts: Mutex::new(Box::new(prompts)),
        }
    }

    async fn say(&self, text: &str) -> Option<()> {
        let mut prompts = self.prompts.lock().await;
        prompts.write_all(text.as_bytes()).await.ok()?;
        prompts.flush().await.ok()
    }

    async fn prompt(&self, label: &str) -> Option<String> {
        self.say(label).await?;

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await.ok()?;
        if read == 0 {
            return None;
        }
        Some(line.trim().to_string())
    }
}

#[async_trait]
impl PaymentProvider for ConsolePaymentProvider {
    async fn collect(&self, intent: &PaymentIntent, context: &PaymentContext) -> PaymentOutcome {
        let intro = format!(
            "\n{} · order {} · {}\n  gateway key:   {}\n  gateway order: {}\nComplete the payment, then paste the callback values.\n",
            context.merchant_name,
            context.order_number,
            context.amount,
            intent.key_id,
            intent.gateway_order_id
        );
        // A closed terminal shows up again at the first prompt.
        let _ = self.say(&intro).await;

        let payment_id = match self.prompt("Payment id (blank to cancel): ").await {
            Some(id) if !id.is_empty() => id,
            _ => return PaymentOutcome::Dismissed,
        };

        match self.prompt("Signature: ").await {
            Some(signature) if !signature.is_empty() => {
                PaymentOutcome::Success(PaymentVerification {
                    gateway_order_id: intent.gateway_order_id.clone(),
                    gateway_payment_id: payment_id,
                    signature,
                })
            }
            _ => PaymentOutcome::Failed {
                reason: "No payment signature was provided".to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shopfront_core::Price;
    use tokio::io::AsyncReadExt;

    fn intent() -> PaymentIntent {
        PaymentIntent {
            gateway_order_id: "order_gw1".to_string(),
            key_id: "rzp_test_key".to_string(),
            amount: 59_000,
            currency: "INR".to_string(),
            order_id: "6f1c2a7e-3b8d-4c55-9a0e-2d7f4b1e9c30".to_string(),
        }
    }

    fn context() -> PaymentContext {
        PaymentContext {
            merchant_name: "Shopfront".to_string(),
            order_number: "ORD0001".to_string(),
            amount: Price::inr(Decimal::new(590, 0)),
            contact: None,
        }
    }

    /// Run `collect` with `typed` as the user's input and return the outcome
    /// and everything written to the prompt sink.
    async fn collect_with(typed: &'static [u8]) -> (PaymentOutcome, String) {
        let (prompts, mut shown) = tokio::io::duplex(4096);
        let provider = ConsolePaymentProvider::new(typed, prompts);

        let outcome = provider.collect(&intent(), &context()).await;
        drop(provider);

        let mut text = String::new();
        shown.read_to_string(&mut text).await.unwrap();
        (outcome, text)
    }

    #[tokio::test]
    async fn test_prompts_go_to_prompt_sink() {
        let (outcome, shown) = collect_with(b"pay_123\nsig_abc\n").await;

        assert_eq!(
            outcome,
            PaymentOutcome::Success(PaymentVerification {
                gateway_order_id: "order_gw1".to_string(),
                gateway_payment_id: "pay_123".to_string(),
                signature: "sig_abc".to_string(),
            })
        );
        assert!(shown.contains("gateway order: order_gw1"));
        assert!(shown.contains("Payment id (blank to cancel): "));
        assert!(shown.contains("Signature: "));
    }

    #[tokio::test]
    async fn test_blank_payment_id_dismisses() {
        let (outcome, shown) = collect_with(b"\n").await;

        assert_eq!(outcome, PaymentOutcome::Dismissed);
        assert!(!shown.contains("Signature: "));
    }

    #[tokio::test]
    async fn test_missing_signature_fails() {
        let (outcome, _) = collect_with(b"pay_123\n").await;

        assert!(matches!(outcome, PaymentOutcome::Failed { .. }));
    }
}
