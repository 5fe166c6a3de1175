use crate::{
    api::ConfessionRoom,
    config::Config,
    forms::{ConfessionForm, CONFESSION_MAX},
    include_res,
    res::{self, escape, fill, js_string},
    timeago,
};

/// Everything the room page shows besides the room itself.
#[derive(Debug, Default)]
pub(crate) struct RoomView {
    pub draft: String,
    /// Revocation token of the confession just submitted. Shown once.
    pub token: Option<String>,
    pub confession_error: String,
    /// Opens the revoke dialog with this token and error prefilled.
    pub revoke_error: Option<(String, String)>,
}

impl RoomView {
    pub fn render(&self, config: &Config, code: &str, room: &ConfessionRoom) -> String {
        let base = config.base();
        let room_path = format!("{base}/{code}");

        let description = if room.description.is_empty() {
            String::new()
        } else {
            fill(
                include_res!(str, "/pages/description.html"),
                &[("description", &escape(&room.description))],
            )
        };

        let confessions: String = room
            .confessions
            .iter()
            .map(|confession| {
                fill(
                    include_res!(str, "/pages/confession.html"),
                    &[
                        ("id", &confession.id.to_string()),
                        ("content", &escape(&confession.content)),
                        ("created_at", &escape(&confession.created_at)),
                        ("when", &escape(&timeago::relative_to_now(&confession.created_at))),
                    ],
                )
            })
            .collect();

        let body = fill(
            include_res!(str, "/pages/room.html"),
            &[
                ("name", &escape(&room.name)),
                ("description", &description),
                ("link_box", &res::link_box(&config.room_link(code))),
                ("confession_form", &self.confession_form(&room_path)),
                ("confessions", &confessions),
                ("revoke_dialog", &self.revoke_dialog(&room_path)),
            ],
        );

        res::page(base, &room.name, &body)
    }

    fn confession_form(&self, room_path: &str) -> String {
        let draft = ConfessionForm {
            content: self.draft.clone(),
        };
        let counter = draft.counter();

        let notice = match &self.token {
            Some(token) => token_notice(token, room_path),
            None => include_res!(str, "/pages/notice.html").to_owned(),
        };

        fill(
            include_res!(str, "/pages/confession_form.html"),
            &[
                ("action", &escape(room_path)),
                ("notice", &notice),
                ("max", &CONFESSION_MAX.to_string()),
                ("content", &escape(&self.draft)),
                ("counter", &counter.to_string()),
                ("counter_class", if counter.is_over_limit() { " over" } else { "" }),
                ("form_error", &escape(&self.confession_error)),
                ("disabled", if draft.can_submit() { "" } else { " disabled" }),
            ],
        )
    }

    fn revoke_dialog(&self, room_path: &str) -> String {
        let (token, error, start_open) = match &self.revoke_error {
            Some((token, error)) => (escape(token), escape(error), " data-start-open"),
            None => (String::new(), String::new(), ""),
        };

        fill(
            include_res!(str, "/pages/revoke_dialog.html"),
            &[
                ("action", &escape(&format!("{room_path}/revoke"))),
                ("token", &token),
                ("error", &error),
                ("start_open", start_open),
            ],
        )
    }
}

fn token_notice(token: &str, room_path: &str) -> String {
    fill(
        include_res!(str, "/pages/token_notice.html"),
        &[("token", &escape(token)), ("room_path", &js_string(room_path))],
    )
}

/// Shown after a confession was stored but the room could not be read back.
pub(crate) fn submitted_page(config: &Config, code: &str, token: &str, message: &str) -> String {
    let base = config.base();
    let room_path = format!("{base}/{code}");
    let body = fill(
        include_res!(str, "/pages/submitted.html"),
        &[
            ("token_notice", &token_notice(token, &room_path)),
            ("message", &escape(message)),
            ("room_path", &escape(&room_path)),
        ],
    );
    res::page(base, "Confession submitted", &body)
}
