//! Server-rendered HTML pages.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::domain::bbcode;
use crate::domain::Post;

/// The list page: every post, in the order given.
pub fn render_index(posts: &[Post]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Posts" }
                script src="/static/forum.js" defer {}
            }
            body {
                h1 { "Posts" }
                form #postForm onsubmit="submitPost(); return false;" {
                    input #usernameInput placeholder="username" required;
                    input #numberInput type="number" value="0" required;
                    textarea #postInput rows="6" cols="60" oninput="updatePreview()" {}
                    button type="submit" { "Post" }
                }
                div #preview hidden {}
                div #results {}
                @if posts.is_empty() {
                    p.empty { "No posts yet." }
                }
                @for post in posts {
                    (post_entry(post))
                }
            }
        }
    }
}

fn post_entry(post: &Post) -> Markup {
    html! {
        article.post id=(format!("post-{}", post.id)) {
            header {
                "#" (post.id) " "
                strong { (post.username) }
                " number " (post.number) " (page " (post.page()) ") "
                time { (post.format_time()) }
                button onclick=(format!("deletePost({})", post.id)) { "Delete" }
            }
            // BBCode output is escaped by the renderer.
            div.content { (PreEscaped(bbcode::render(&post.content).html)) }
        }
    }
}

/// Generic failure page. Carries no detail about the fault.
pub fn internal_error_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Server Error" }
            }
            body {
                h1 { "500 Internal Server Error" }
                p { "Something went wrong. Please try again later." }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostId, TimeMs};

    fn post(id: i64, username: &str, number: i64, content: &str) -> Post {
        Post {
            id: PostId::new(id),
            username: username.to_string(),
            number,
            content: content.to_string(),
            timestamp: TimeMs::new(1_709_647_620_000),
        }
    }

    #[test]
    fn test_empty_index() {
        let page = render_index(&[]).into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("No posts yet."));
        assert!(page.ends_with("</html>"));
    }

    #[test]
    fn test_index_renders_derived_fields_and_bbcode() {
        let page = render_index(&[post(7, "alice", 23, "[b]hi[/b]")]).into_string();
        assert!(page.contains("#7 <strong>alice</strong>"));
        assert!(page.contains("(page 20)"));
        assert!(page.contains("Mar 05, 2024, 02:07 PM"));
        assert!(page.contains("<b>hi</b>"));
        assert!(page.contains("deletePost(7)"));
    }

    #[test]
    fn test_index_escapes_username_and_content() {
        let page = render_index(&[post(1, "<img>", 0, "<script>x</script>")]).into_string();
        assert!(page.contains("&lt;img&gt;"));
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!page.contains("<script>x"));
    }

    #[test]
    fn test_index_keeps_given_order() {
        let page =
            render_index(&[post(2, "b", 0, "second"), post(1, "a", 0, "first")]).into_string();
        let second = page.find("post-2").unwrap();
        let first = page.find("post-1").unwrap();
        assert!(second < first);
    }

    #[test]
    fn test_error_page_is_generic() {
        let page = internal_error_page().into_string();
        assert!(page.contains("500 Internal Server Error"));
    }
}
