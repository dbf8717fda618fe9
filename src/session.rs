//! Pagination sessions: one environment per document compiler

use crate::config::{PageConfig, RawOptions};
use crate::document::{DocumentContext, Element};
use crate::layout::{paginate, FontMetrics, Measure, Page, PageIndex, Pagination};
use crate::render::{fill_contents, fill_headers, page_style_css, Contents, LeaderMetrics};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause between consecutive pagination runs, and before listeners run
pub const RUN_PAUSE: Duration = Duration::from_millis(1000);

/// Identity of one document compiler instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerId(pub u64);

/// Work deferred until the page list is final
#[derive(Debug, Clone, PartialEq)]
pub enum PagedListener {
    /// Resolve the page labels and leader dots of one contents block
    Contents { block: String, dot_gap: f32 },
}

/// When the host should paginate.
///
/// The library never sleeps; hosts wait out each delay, re-measure and
/// call [`Environment::paginate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSchedule {
    /// Debounce before the first run
    pub delay: Duration,
    /// Between runs, and between the last run and the paged listeners
    pub pause: Duration,
    pub runs: u32,
}

impl RunSchedule {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            delay: config.break_delay,
            pause: RUN_PAUSE,
            runs: config.break_num.max(1),
        }
    }

    /// Delay before each run, in order
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.runs).map(move |i| if i == 0 { self.delay } else { self.pause })
    }
}

/// Output of a finished session run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedDocument {
    pub pages: Vec<Page>,
    pub index: PageIndex,
    /// Print stylesheet; `None` when embedded
    pub style: Option<String>,
    /// The embedding host must be told the layout changed
    pub adjust: bool,
}

/// Everything one compiler's pagination needs between runs
#[derive(Debug, Clone)]
pub struct Environment {
    config: PageConfig,
    font: FontMetrics,
    listeners: Vec<PagedListener>,
}

impl Environment {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            font: FontMetrics::default(),
            listeners: Vec::new(),
        }
    }

    pub fn with_font(mut self, font: FontMetrics) -> Self {
        self.font = font;
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn listeners(&self) -> &[PagedListener] {
        &self.listeners
    }

    pub fn schedule(&self) -> RunSchedule {
        RunSchedule::from_config(&self.config)
    }

    /// Render a `contents` unit and queue its label fill for after
    /// pagination.
    pub fn contents(&mut self, context: &DocumentContext, options: &RawOptions) -> Element {
        let contents = Contents::collect(context, options);
        let block = self.listeners.len().to_string();
        let element = contents.render(&block, &self.font, self.config.main_width());
        self.listeners.push(PagedListener::Contents {
            block,
            dot_gap: contents.dot_gap,
        });
        element
    }

    /// One pagination run, with running headers filled in
    pub fn paginate(
        &self,
        lines: &[Element],
        context: &DocumentContext,
        measure: impl Measure,
    ) -> Pagination {
        let mut pagination = paginate(lines, &self.config, context, measure);
        fill_headers(&mut pagination, &self.config, context);
        pagination
    }

    /// Drain the paged listeners over the final pagination and report the
    /// completed document.
    pub fn finish(
        &self,
        mut pagination: Pagination,
        context: &DocumentContext,
        metrics: &impl LeaderMetrics,
    ) -> PagedDocument {
        let width = self.config.main_width();
        for listener in &self.listeners {
            match listener {
                PagedListener::Contents { block, dot_gap } => {
                    fill_contents(&mut pagination, block, *dot_gap, metrics, width);
                }
            }
        }

        let embedded = context.is_embedded();
        PagedDocument {
            pages: pagination.pages,
            index: pagination.index,
            style: page_style_css(self.config.size, embedded),
            adjust: embedded,
        }
    }

    /// Every scheduled run back to back, then the listeners.
    ///
    /// Runs after the first only matter when `measure` reports different
    /// extents between calls.
    pub fn run<M: Measure>(
        &self,
        lines: &[Element],
        context: &DocumentContext,
        measure: &M,
        metrics: &impl LeaderMetrics,
    ) -> PagedDocument {
        let runs = self.schedule().runs;
        let mut pagination = self.paginate(lines, context, measure);
        for _ in 1..runs {
            pagination = self.paginate(lines, context, measure);
        }
        log::debug!(
            "session finished after {} runs: {} pages",
            runs,
            pagination.pages.len()
        );
        self.finish(pagination, context, metrics)
    }
}

/// Outcome of [`Sessions::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The compiler already has an environment; nothing changed
    AlreadyActive,
    /// No host container to paginate into; nothing registered
    NoContainer,
}

/// Environments keyed by compiler, so several documents can be paged at
/// once.
#[derive(Debug, Default)]
pub struct Sessions {
    envs: FxHashMap<CompilerId, Environment>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the environment for `compiler` from its `page` unit options.
    pub fn register(
        &mut self,
        compiler: CompilerId,
        options: &RawOptions,
        has_container: bool,
    ) -> Registration {
        if self.envs.contains_key(&compiler) {
            log::debug!("compiler {} already paginating", compiler.0);
            return Registration::AlreadyActive;
        }
        if !has_container {
            log::debug!("compiler {} has no page container", compiler.0);
            return Registration::NoContainer;
        }
        let config = PageConfig::resolve(options);
        log::debug!(
            "compiler {}: {}x{}px pages, right level {}, break level {}",
            compiler.0,
            config.size.width,
            config.size.height,
            config.levels.right_level(),
            config.levels.break_level()
        );
        self.envs.insert(compiler, Environment::new(config));
        Registration::Registered
    }

    pub fn get(&self, compiler: CompilerId) -> Option<&Environment> {
        self.envs.get(&compiler)
    }

    pub fn get_mut(&mut self, compiler: CompilerId) -> Option<&mut Environment> {
        self.envs.get_mut(&compiler)
    }

    /// Render a `contents` unit for `compiler`; an inert empty element when
    /// the compiler has no environment.
    pub fn contents(
        &mut self,
        compiler: CompilerId,
        context: &DocumentContext,
        options: &RawOptions,
    ) -> Element {
        match self.envs.get_mut(&compiler) {
            Some(env) => env.contents(context, options),
            None => Element::new(),
        }
    }

    pub fn release(&mut self, compiler: CompilerId) -> Option<Environment> {
        self.envs.remove(&compiler)
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{IndexInfo, Node};
    use crate::layout::StackMeasure;
    use crate::render::FontLeaderMetrics;

    #[test]
    fn test_register_guard() {
        let mut sessions = Sessions::new();
        let id = CompilerId(1);
        let options = RawOptions::new().with("size", "A5");

        assert_eq!(sessions.register(id, &options, false), Registration::NoContainer);
        assert!(sessions.is_empty());
        assert_eq!(sessions.register(id, &options, true), Registration::Registered);

        let other = RawOptions::new().with("size", "A3");
        assert_eq!(sessions.register(id, &other, true), Registration::AlreadyActive);
        assert_eq!(
            sessions.get(id).map(|env| env.config().size),
            crate::config::Size::named("A5")
        );

        assert_eq!(sessions.register(CompilerId(2), &other, true), Registration::Registered);
        assert_eq!(sessions.len(), 2);
        assert!(sessions.release(id).is_some());
        assert_eq!(sessions.register(id, &other, true), Registration::Registered);
    }

    #[test]
    fn test_contents_without_environment_is_inert() {
        let mut sessions = Sessions::new();
        let context = DocumentContext::new(vec![IndexInfo::heading("a", &[1], "A")]);
        let element = sessions.contents(CompilerId(9), &context, &RawOptions::new());
        assert_eq!(element, Element::new());
    }

    #[test]
    fn test_schedule() {
        let config = PageConfig::resolve(
            &RawOptions::new()
                .with("break-delay", 0.25)
                .with("break-num", 3.0),
        );
        let schedule = RunSchedule::from_config(&config);
        let delays: Vec<_> = schedule.delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(250), RUN_PAUSE, RUN_PAUSE]
        );
        assert_eq!(schedule.pause, RUN_PAUSE);

        let single = RunSchedule::from_config(&PageConfig::default());
        assert_eq!(single.delays().count(), 1);
    }

    #[test]
    fn test_run_fills_contents_and_style() {
        let mut sessions = Sessions::new();
        let id = CompilerId(1);
        let options = RawOptions::new()
            .with("size", "240px 140px")
            .with("margin", "20px");
        sessions.register(id, &options, true);

        let context = DocumentContext::new(vec![
            IndexInfo::heading("a", &[1], "Alpha"),
            IndexInfo::heading("b", &[2], "Beta"),
        ]);
        let toc = sessions.contents(id, &context, &RawOptions::new());
        let heading = |id: &str| {
            Element::new().with_child(Element::new().with_id(id).with_child(Node::text(id, 10.0)))
        };
        let lines = vec![Element::new().with_child(toc), heading("a"), heading("b")];

        let env = sessions.get(id).unwrap();
        assert_eq!(env.listeners().len(), 1);
        let document = env.run(&lines, &context, &StackMeasure, &FontLeaderMetrics::default());

        assert_eq!(document.pages.len(), 1);
        assert!(!document.adjust);
        assert!(document
            .style
            .as_deref()
            .unwrap()
            .contains("size: 240px 140px;"));

        let mut labels = Vec::new();
        document.pages[0].main.blocks[0].element.walk(&mut |e| {
            if e.has_class(crate::render::toc::PAGE_CLASS) {
                labels.push(e.plain_text());
            }
        });
        assert_eq!(labels, vec!["1", "1"]);
        assert_eq!(document.pages[0].header.content, "Alpha");
    }

    #[test]
    fn test_embedded_run_signals_adjust() {
        let env = Environment::new(PageConfig::default());
        let context = DocumentContext::default().embedded(true);
        let document = env.run(&[], &context, &StackMeasure, &FontLeaderMetrics::default());
        assert!(document.adjust);
        assert_eq!(document.style, None);
        assert_eq!(document.pages.len(), 1);
    }
}
