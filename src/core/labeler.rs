use crate::core::{LabeledPost, PostRecord, Result, Sentiment, SentimentClassifier};
use crate::utils::error::EtlError;

pub const TEXT_PLACEHOLDER: &str = "{text}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "Clasifica este texto de Twitter en positivo, negativo o neutro(solo una palabra en la respuesta):\n\nTexto: {text}\n\n";

pub struct SentimentLabeler<C: SentimentClassifier> {
    classifier: C,
    template: String,
}

impl<C: SentimentClassifier> SentimentLabeler<C> {
    pub fn new(classifier: C) -> Self {
        Self::with_template(classifier, DEFAULT_PROMPT_TEMPLATE)
    }

    pub fn with_template(classifier: C, template: impl Into<String>) -> Self {
        Self {
            classifier,
            template: template.into(),
        }
    }

    pub fn build_prompt(&self, text: &str) -> String {
        self.template.replace(TEXT_PLACEHOLDER, text)
    }

    /// Never fails: any classifier error becomes `Sentiment::Error`.
    pub async fn label(&self, text: &str) -> Sentiment {
        match self.try_label(text).await {
            Ok(label) => Sentiment::Label(label),
            Err(e) => {
                tracing::warn!("⚠️ Sentiment classification failed: {}", e);
                Sentiment::Error
            }
        }
    }

    pub async fn try_label(&self, text: &str) -> Result<String> {
        let prompt = self.build_prompt(text);
        let raw = self.classifier.classify(&prompt).await?;
        extract_label(&raw)
    }

    /// 逐筆依序呼叫，前一筆完成後才送出下一筆
    pub async fn label_all(&self, posts: Vec<PostRecord>) -> Vec<LabeledPost> {
        let total = posts.len();
        let mut labeled = Vec::with_capacity(total);

        for (index, post) in posts.into_iter().enumerate() {
            let sentiment = self.label(&post.text).await;
            tracing::debug!(
                "Labeled post {} ({}/{}) as {}",
                post.id,
                index + 1,
                total,
                sentiment
            );
            labeled.push(LabeledPost { post, sentiment });
        }

        let failures = labeled.iter().filter(|p| p.sentiment.is_error()).count();
        if failures > 0 {
            tracing::warn!("{} of {} posts could not be classified", failures, total);
        }

        labeled
    }
}

/// First line of the completion, trimmed. An empty completion is malformed.
pub fn extract_label(raw: &str) -> Result<String> {
    raw.trim()
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| EtlError::ClassifierError {
            message: "completion contained no text".to_string(),
        })
}
