//! Declarative description of the demo page.
//!
//! The page is a plain tree of layout nodes and components. It carries no behavior: the client
//! script binds events to the element ids declared here, and the handlers in
//! [`crate::handlers`] answer them. [`render_page`] turns the tree into a document with leptos'
//! server-side renderer.

use std::fmt::Display;

use leptos::prelude::*;
use tune_a_video_core::{
    controls::{Dropdown, Slider, FPS, GUIDANCE_SCALE, MODEL_ID, NUM_STEPS, SEED, VIDEO_LENGTH},
    example_requests, GenerationRequest,
};

/// Element ids the client script relies on.
pub mod ids {
    pub const MODEL_ID: &str = tune_a_video_core::controls::MODEL_ID.id;
    pub const BASE_MODEL: &str = "base_model";
    pub const TRAINING_PROMPT: &str = "training_prompt";
    pub const PROMPT: &str = "prompt";
    pub const RUN: &str = "run";
    pub const RESULT: &str = "result";
    pub const STATUS: &str = "status";
    pub const EXAMPLES: &str = "examples";
}

pub const TITLE: &str = "Tune-A-Video";
pub const TITLE_LINK: &str = "https://tuneavideo.github.io/";

const NOTES: &[&str] = &[
    "It takes a few minutes to download model first.",
    "Expected time to generate an 8-frame video: 70 seconds with T4, 24 seconds with A10G, (10 seconds with A100)",
];

#[derive(Debug, Clone)]
pub enum Component {
    Dropdown(Dropdown),
    Textbox {
        id: &'static str,
        label: &'static str,
        placeholder: &'static str,
    },
    /// Read-only text output.
    Text {
        id: &'static str,
        label: &'static str,
    },
    IntSlider(Slider<u32>),
    FloatSlider(Slider<f64>),
    Button {
        id: &'static str,
        label: &'static str,
    },
    Video {
        id: &'static str,
        label: &'static str,
    },
    Status {
        id: &'static str,
    },
    Notes(&'static [&'static str]),
    Examples {
        id: &'static str,
        /// Control ids each example column fills, in column order.
        inputs: [&'static str; 7],
        rows: Vec<GenerationRequest>,
    },
}

impl Component {
    pub fn id(&self) -> Option<&'static str> {
        match self {
            Self::Dropdown(dropdown) => Some(dropdown.id),
            Self::IntSlider(slider) => Some(slider.id),
            Self::FloatSlider(slider) => Some(slider.id),
            Self::Textbox { id, .. }
            | Self::Text { id, .. }
            | Self::Button { id, .. }
            | Self::Video { id, .. }
            | Self::Status { id }
            | Self::Examples { id, .. } => Some(*id),
            Self::Notes(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Row(Vec<Node>),
    Column(Vec<Node>),
    Group(Vec<Node>),
    Accordion {
        label: &'static str,
        open: bool,
        children: Vec<Node>,
    },
    Component(Component),
}

impl Node {
    /// All components below this node, depth first.
    pub fn components(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Component>) {
        match self {
            Self::Row(children) | Self::Column(children) | Self::Group(children) => {
                children.iter().for_each(|child| child.collect(out))
            }
            Self::Accordion { children, .. } => {
                children.iter().for_each(|child| child.collect(out))
            }
            Self::Component(component) => out.push(component),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub title: &'static str,
    pub title_link: &'static str,
    pub body: Node,
}

/// The demo page: inputs on the left, the video on the right, examples below.
pub fn demo_page() -> Page {
    use self::Component as C;
    use Node::Component as N;

    let inputs = Node::Column(vec![
        Node::Group(vec![
            N(C::Dropdown(MODEL_ID)),
            Node::Accordion {
                label: "Model info (Base model and prompt used for training)",
                open: false,
                children: vec![Node::Row(vec![
                    N(C::Text {
                        id: ids::BASE_MODEL,
                        label: "Base model",
                    }),
                    N(C::Text {
                        id: ids::TRAINING_PROMPT,
                        label: "Training prompt",
                    }),
                ])],
            },
        ]),
        N(C::Textbox {
            id: ids::PROMPT,
            label: "Prompt",
            placeholder: "Example: \"A panda is surfing\"",
        }),
        N(C::IntSlider(VIDEO_LENGTH)),
        N(C::IntSlider(FPS)),
        N(C::IntSlider(SEED)),
        Node::Accordion {
            label: "Other Parameters",
            open: false,
            children: vec![N(C::IntSlider(NUM_STEPS)), N(C::FloatSlider(GUIDANCE_SCALE))],
        },
        N(C::Button {
            id: ids::RUN,
            label: "Generate",
        }),
        N(C::Notes(NOTES)),
    ]);

    let output = Node::Column(vec![
        N(C::Video {
            id: ids::RESULT,
            label: "Result",
        }),
        N(C::Status { id: ids::STATUS }),
    ]);

    let examples = Node::Row(vec![N(C::Examples {
        id: ids::EXAMPLES,
        inputs: [
            MODEL_ID.id,
            ids::PROMPT,
            VIDEO_LENGTH.id,
            FPS.id,
            SEED.id,
            NUM_STEPS.id,
            GUIDANCE_SCALE.id,
        ],
        rows: example_requests(),
    })]);

    Page {
        title: TITLE,
        title_link: TITLE_LINK,
        body: Node::Column(vec![Node::Row(vec![inputs, output]), examples]),
    }
}

/// Render the full HTML document.
pub fn render_page(page: &Page) -> String {
    Owner::new().with(|| page_view(page).to_html())
}

fn page_view(page: &Page) -> impl IntoView {
    let title = page.title;
    let link = page.title_link;
    let body = node_view(&page.body);
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>{title}</title>
                <link rel="stylesheet" href="/assets/style.css" />
            </head>
            <body>
                <h1>
                    <a href=link>{title}</a>
                </h1>
                {body}
                <script src="/assets/app.js"></script>
            </body>
        </html>
    }
}

fn node_view(node: &Node) -> AnyView {
    match node {
        Node::Row(children) => container("row", children),
        Node::Column(children) => container("column", children),
        Node::Group(children) => container("group", children),
        Node::Accordion {
            label,
            open,
            children,
        } => {
            let label = *label;
            let open = *open;
            let children: Vec<AnyView> = children.iter().map(node_view).collect();
            view! {
                <details class="accordion" open=open>
                    <summary>{label}</summary>
                    {children}
                </details>
            }
            .into_any()
        }
        Node::Component(component) => leaf_view(component),
    }
}

fn container(class: &'static str, children: &[Node]) -> AnyView {
    let children: Vec<AnyView> = children.iter().map(node_view).collect();
    view! { <div class=class>{children}</div> }.into_any()
}

fn slider_view<T: Display>(slider: &Slider<T>) -> AnyView {
    let id = slider.id;
    let label = slider.label;
    let default = slider.default.to_string();
    view! {
        <label class="slider">
            <span>{label}</span>
            <output for=id>{default.clone()}</output>
            <input
                type="range"
                id=id
                name=id
                min={slider.min.to_string()}
                max={slider.max.to_string()}
                step={slider.step.to_string()}
                value=default
            />
        </label>
    }
    .into_any()
}

#[component]
fn ExampleTable(
    id: &'static str,
    inputs: [&'static str; 7],
    rows: Vec<GenerationRequest>,
) -> impl IntoView {
    view! {
        <table id=id class="examples" data-inputs={inputs.join(" ")}>
            <caption>"Examples"</caption>
            {rows
                .into_iter()
                .enumerate()
                .map(|(index, row)| {
                    view! {
                        <tr data-index={index.to_string()}>
                            <td>{row.model_id}</td>
                            <td>{row.prompt}</td>
                            <td>{row.video_length.to_string()}</td>
                            <td>{row.fps.to_string()}</td>
                            <td>{row.seed.to_string()}</td>
                            <td>{row.num_steps.to_string()}</td>
                            <td>{row.guidance_scale.to_string()}</td>
                        </tr>
                    }
                })
                .collect_view()}
        </table>
    }
}

fn leaf_view(component: &Component) -> AnyView {
    match component {
        Component::Dropdown(dropdown) => {
            let Dropdown {
                id,
                label,
                choices,
                default,
            } = *dropdown;
            let options = choices
                .iter()
                .map(|&choice| {
                    view! { <option value=choice selected={choice == default}>{choice}</option> }
                })
                .collect_view();
            view! {
                <label>
                    <span>{label}</span>
                    <select id=id name=id>{options}</select>
                </label>
            }
            .into_any()
        }
        Component::Textbox {
            id,
            label,
            placeholder,
        } => {
            let (id, label, placeholder) = (*id, *label, *placeholder);
            view! {
                <label>
                    <span>{label}</span>
                    <input type="text" id=id name=id placeholder=placeholder />
                </label>
            }
            .into_any()
        }
        Component::Text { id, label } => {
            let (id, label) = (*id, *label);
            view! {
                <label>
                    <span>{label}</span>
                    <input type="text" id=id readonly=true />
                </label>
            }
            .into_any()
        }
        Component::IntSlider(slider) => slider_view(slider),
        Component::FloatSlider(slider) => slider_view(slider),
        Component::Button { id, label } => {
            let (id, label) = (*id, *label);
            view! { <button type="button" id=id>{label}</button> }.into_any()
        }
        Component::Video { id, label } => {
            let (id, label) = (*id, *label);
            view! {
                <figure>
                    <figcaption>{label}</figcaption>
                    <video id=id controls=true autoplay=true></video>
                </figure>
            }
            .into_any()
        }
        Component::Status { id } => {
            let id = *id;
            view! { <p id=id class="status" role="status"></p> }.into_any()
        }
        Component::Notes(notes) => {
            let items = notes
                .iter()
                .map(|&note| view! { <li>{note}</li> })
                .collect_view();
            view! { <ul class="notes">{items}</ul> }.into_any()
        }
        Component::Examples { id, inputs, rows } => view! {
            <ExampleTable id={*id} inputs={*inputs} rows={rows.clone()} />
        }
        .into_any(),
    }
}
