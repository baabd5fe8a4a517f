use crate::handlers::StatusPayload;

/// A deliberately template-engine-free status page: one static-shaped
/// table, built with `format!` rather than pulling in a new templating
/// dependency for a single page.
pub fn render_dashboard(status: &StatusPayload) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>sekin supervisor</title></head><body>\
<h1>sekin supervisor</h1>\
<table border=\"1\" cellpadding=\"6\">\
<tr><th>component</th><th>version</th><th>running</th></tr>\
<tr><td>sekai</td><td>{}</td><td>{}</td></tr>\
<tr><td>interx</td><td>{}</td><td>{}</td></tr>\
<tr><td>supervisor</td><td>{}</td><td>{}</td></tr>\
</table></body></html>",
        status.sekai.version,
        status.sekai.infra,
        status.interx.version,
        status.interx.infra,
        status.supervisor.version,
        status.supervisor.infra,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ComponentStatus;

    #[test]
    fn renders_a_row_per_component() {
        let status = StatusPayload {
            sekai: ComponentStatus { version: "v0.4.1".to_string(), infra: true },
            interx: ComponentStatus { version: "v0.3.0".to_string(), infra: false },
            supervisor: ComponentStatus { version: "v0.1.0".to_string(), infra: true },
        };
        let html = render_dashboard(&status);
        assert!(html.contains("v0.4.1"));
        assert!(html.contains("v0.3.0"));
        assert!(html.contains("<table"));
    }
}
