//! Turnstile widget controller
//!
//! On connect, waits for the SDK to be ready and renders the widget once,
//! translating its callbacks into [`BotProtectionEvent`]s.

use std::rc::Rc;

use crate::event::{BotProtectionEvent, BotProtectionEventSink};
use crate::theme::Theme;
use crate::widget::{TurnstileApi, WidgetCallbacks, WidgetOptions};

/// Current color scheme of the page ("light", "dark", ...)
pub trait ColorSchemeSource {
    fn color_scheme(&self) -> String;
}

/// A color scheme that never changes
#[derive(Debug, Clone)]
pub struct FixedColorScheme(pub String);

impl ColorSchemeSource for FixedColorScheme {
    fn color_scheme(&self) -> String {
        self.0.clone()
    }
}

pub struct TurnstileController<A: TurnstileApi> {
    api: Rc<A>,
    target: Rc<A::Target>,
    site_key: String,
    language: String,
    color_scheme: Rc<dyn ColorSchemeSource>,
    events: Rc<dyn BotProtectionEventSink>,
}

impl<A> TurnstileController<A>
where
    A: TurnstileApi + 'static,
    A::Target: 'static,
{
    pub fn new(
        api: Rc<A>,
        target: A::Target,
        site_key: impl Into<String>,
        language: impl Into<String>,
        color_scheme: Rc<dyn ColorSchemeSource>,
        events: Rc<dyn BotProtectionEventSink>,
    ) -> Self {
        Self {
            api,
            target: Rc::new(target),
            site_key: site_key.into(),
            language: language.into(),
            color_scheme,
            events,
        }
    }

    /// Register with the SDK; the widget renders when it is ready.
    ///
    /// The color scheme is read at render time, not at connect time.
    pub fn connect(&self) {
        let api = Rc::clone(&self.api);
        let target = Rc::clone(&self.target);
        let color_scheme = Rc::clone(&self.color_scheme);
        let events = Rc::clone(&self.events);
        let site_key = self.site_key.clone();
        let language = self.language.clone();

        self.api.ready(Box::new(move || {
            let theme = Theme::parse(&color_scheme.color_scheme());
            let options = WidgetOptions::new(site_key, theme, language);
            tracing::debug!(theme = %theme, "rendering bot protection widget");
            api.render(&target, options, event_callbacks(events));
        }));
    }
}

fn event_callbacks(events: Rc<dyn BotProtectionEventSink>) -> WidgetCallbacks {
    let on_success = {
        let events = Rc::clone(&events);
        move |token: &str| {
            events.dispatch(BotProtectionEvent::Verified {
                token: token.to_string(),
            })
        }
    };
    let on_error = {
        let events = Rc::clone(&events);
        move |error_code: &str| {
            events.dispatch(BotProtectionEvent::Failed {
                error_code: error_code.to_string(),
            });
            true
        }
    };
    let on_expired = move |token: &str| {
        events.dispatch(BotProtectionEvent::Expired {
            token: token.to_string(),
        })
    };

    WidgetCallbacks {
        on_success: Box::new(on_success),
        on_error: Box::new(on_error),
        on_expired: Box::new(on_expired),
    }
}
