use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

/// Delay between two revealed steps
pub const STEP_INTERVAL: Duration = Duration::from_secs(2);

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:🔍|🧠|📋|⚙️|⚙|🛠️|🛠|📊|✅|\*\*Step\s+\d+[^*\n]*\*\*|#{2,4}[ \t]+Step[ \t]+\d+)[^\n]*",
        )
        .expect("marker pattern is valid")
    })
}

/// Extract marker lines from `text`, in order of appearance
pub fn extract_steps(text: &str) -> Vec<String> {
    marker_pattern()
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Step-by-step reveal of a processed answer
#[derive(Debug, Clone)]
pub struct ProcessingSteps {
    content: String,
    steps: Vec<String>,
    visible: usize,
    animation_complete: bool,
}

impl ProcessingSteps {
    /// Segment `content`.
    ///
    /// The first step is visible right away. Content without markers is
    /// complete immediately.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let steps = extract_steps(&content);
        let animation_complete = steps.is_empty();
        let visible = usize::from(!steps.is_empty());

        debug!("Segmented content into {} processing steps", steps.len());
        Self {
            content,
            steps,
            visible,
            animation_complete,
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Steps revealed so far
    pub fn visible_steps(&self) -> &[String] {
        &self.steps[..self.visible]
    }

    /// The most recently revealed step
    pub fn current_step(&self) -> Option<&str> {
        self.visible_steps().last().map(String::as_str)
    }

    pub fn animation_complete(&self) -> bool {
        self.animation_complete
    }

    /// Full content, available once the animation has finished
    pub fn display_content(&self) -> Option<&str> {
        self.animation_complete.then_some(self.content.as_str())
    }

    /// Advance one tick; returns false once there is nothing left to do
    pub fn tick(&mut self) -> bool {
        if self.animation_complete {
            return false;
        }
        if self.visible < self.steps.len() {
            self.visible += 1;
        } else {
            self.animation_complete = true;
        }
        true
    }

    /// Drive the reveal on a fixed interval, calling `on_update` after each tick.
    ///
    /// A zero `period` reveals every remaining step without waiting.
    pub async fn animate<F>(&mut self, period: Duration, mut on_update: F)
    where
        F: FnMut(&ProcessingSteps),
    {
        if period.is_zero() {
            while self.tick() {
                on_update(self);
            }
            return;
        }

        let mut interval = tokio::time::interval(period);
        // The first tick of an interval fires immediately
        interval.tick().await;

        while !self.animation_complete {
            interval.tick().await;
            self.tick();
            on_update(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "🔍 Searching the knowledge base\n\
        Some plain text that is not a step.\n\
        🧠 Reasoning about the results\n\
        **Step 3: Draft**\n\
        ### Step 4 Review\n\
        ✅ Done\n\
        \n\
        Final answer body.";

    #[test]
    fn test_no_markers_completes_immediately() {
        let steps = ProcessingSteps::new("Just a plain answer.");

        assert!(steps.animation_complete());
        assert!(steps.steps().is_empty());
        assert_eq!(steps.display_content(), Some("Just a plain answer."));
        assert!(steps.current_step().is_none());
    }

    #[test]
    fn test_extracts_markers_in_order() {
        let steps = extract_steps(ANSWER);

        assert_eq!(
            steps,
            vec![
                "🔍 Searching the knowledge base",
                "🧠 Reasoning about the results",
                "**Step 3: Draft**",
                "### Step 4 Review",
                "✅ Done",
            ]
        );
    }

    #[test]
    fn test_markers_only_count_at_line_start() {
        let steps = extract_steps("The result ✅ is inline, not a step.");
        assert!(steps.is_empty());
    }

    #[test]
    fn test_gear_with_and_without_variation_selector() {
        let steps = extract_steps("⚙️ Configuring\n⚙ Tuning");
        assert_eq!(steps, vec!["⚙️ Configuring", "⚙ Tuning"]);
    }

    #[test]
    fn test_tick_reveals_then_completes() {
        let mut steps = ProcessingSteps::new("🔍 one\n✅ two\nbody");
        assert_eq!(steps.visible_steps().len(), 1);
        assert_eq!(steps.current_step(), Some("🔍 one"));
        assert!(steps.display_content().is_none());

        assert!(steps.tick());
        assert_eq!(steps.current_step(), Some("✅ two"));
        assert!(!steps.animation_complete());

        assert!(steps.tick());
        assert!(steps.animation_complete());
        assert_eq!(steps.display_content(), Some("🔍 one\n✅ two\nbody"));

        assert!(!steps.tick());
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_ticks_on_interval() {
        let mut steps = ProcessingSteps::new(ANSWER);
        let started = tokio::time::Instant::now();
        let mut updates = 0;

        steps.animate(STEP_INTERVAL, |_| updates += 1).await;

        // Four more steps to reveal, then one tick to finish
        assert_eq!(updates, 5);
        assert!(steps.animation_complete());
        assert!(started.elapsed() >= STEP_INTERVAL * 5);
        assert!(started.elapsed() < STEP_INTERVAL * 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_with_zero_period_reveals_at_once() {
        let mut steps = ProcessingSteps::new(ANSWER);
        let started = tokio::time::Instant::now();
        let mut updates = 0;

        steps.animate(Duration::ZERO, |_| updates += 1).await;

        assert_eq!(updates, 5);
        assert!(steps.animation_complete());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_without_markers_returns_immediately() {
        let mut steps = ProcessingSteps::new("plain");
        let mut updates = 0;

        steps.animate(STEP_INTERVAL, |_| updates += 1).await;

        assert_eq!(updates, 0);
    }
}
