//! The form's event loop.
//!
//! One task owns the controller. It wakes on user events, on debounced tax id changes and
//! on fetch state changes, re-renders the form and publishes the resulting view.

use crate::app::command::FormEvent;
use crate::core::form::{FormController, FormView};
use crate::core::SubmissionSink;
use tokio::sync::{mpsc, watch};

pub struct FormSession<S: SubmissionSink> {
    controller: FormController<S>,
    view: watch::Sender<FormView>,
}

impl<S: SubmissionSink> FormSession<S> {
    pub fn new(mut controller: FormController<S>) -> Self {
        let (view, _) = watch::channel(controller.render());
        Self { controller, view }
    }

    pub fn subscribe(&self) -> watch::Receiver<FormView> {
        self.view.subscribe()
    }

    /// 執行到收到 `Quit` 或事件通道關閉為止，回傳 controller 供檢查
    pub async fn run(mut self, mut events: mpsc::Receiver<FormEvent>) -> FormController<S> {
        let mut debounced = self.controller.subscribe_debounced();
        let mut fetch = self.controller.subscribe_fetch();

        tracing::info!("Form session started");
        loop {
            let mut notice = None;
            let mut show = false;

            tokio::select! {
                event = events.recv() => match event {
                    None | Some(FormEvent::Quit) => break,
                    Some(FormEvent::Change { field, value }) => {
                        if let Err(e) = self.controller.handle_change(field, &value) {
                            tracing::warn!("Rejected change to {}: {}", field, e);
                            notice = Some(e.user_friendly_message());
                        }
                    }
                    Some(FormEvent::Submit) => match self.controller.submit().await {
                        Ok(record) => {
                            notice = Some(format!(
                                "Invoice submitted (price gross: {}$)",
                                record.price_gross
                            ));
                        }
                        Err(e) => {
                            tracing::warn!("Submission blocked: {}", e);
                            notice = Some(e.user_friendly_message());
                        }
                    },
                    Some(FormEvent::Show) => show = true,
                },
                Ok(()) = debounced.changed() => {
                    debounced.borrow_and_update();
                }
                Ok(()) = fetch.changed() => {
                    fetch.borrow_and_update();
                }
            }

            let mut view = self.controller.render();
            if show {
                notice = Some(view.summary());
            }
            view.notice = notice;
            self.view.send_replace(view);
        }

        tracing::info!("Form session finished");
        self.controller
    }
}
