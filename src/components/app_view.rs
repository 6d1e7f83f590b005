//! Routes of the dashboard.

use dioxus::prelude::*;

use crate::components::views::{
    CallDetailView, CallsView, ComplaintDetailView, ComplaintsView, NotFound,
};
use crate::components::AppShell;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum AppView {
    #[layout(AppShell)]
        #[route("/")]
        CallsView {},
        #[route("/calls/:id")]
        CallDetailView { id: String },
        #[route("/complaints")]
        ComplaintsView {},
        #[route("/complaints/:id")]
        ComplaintDetailView { id: String },
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

pub fn view_label(view: &AppView) -> &'static str {
    match view {
        AppView::CallsView {} => "Calls",
        AppView::CallDetailView { .. } => "Call",
        AppView::ComplaintsView {} => "Complaints",
        AppView::ComplaintDetailView { .. } => "Complaint",
        AppView::NotFound { .. } => "Not found",
    }
}

/// Top-level tab a view belongs to.
pub fn section_of(view: &AppView) -> Option<&'static str> {
    match view {
        AppView::CallsView {} | AppView::CallDetailView { .. } => Some("calls"),
        AppView::ComplaintsView {} | AppView::ComplaintDetailView { .. } => Some("complaints"),
        AppView::NotFound { .. } => None,
    }
}
