//! The two illustrative flows on the workflow tab. Static content with no
//! link to the catalog.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Blue,
    Green,
    Red,
}

impl Tone {
    pub fn color(self) -> &'static str {
        match self {
            Tone::Blue => "#2563eb",
            Tone::Green => "#16a34a",
            Tone::Red => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Span {
    Text(&'static str),
    Code(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub answer: &'static str,
    pub result: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlowStep {
    Step {
        label: &'static str,
        caption: Vec<Span>,
    },
    Branch {
        label: &'static str,
        outcomes: Vec<Outcome>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub title: &'static str,
    pub tone: Tone,
    pub steps: Vec<FlowStep>,
}

fn step(label: &'static str, caption: Vec<Span>) -> FlowStep {
    FlowStep::Step { label, caption }
}

pub fn checkout() -> Workflow {
    use Span::*;

    Workflow {
        title: "Book Checkout Process",
        tone: Tone::Blue,
        steps: vec![
            step("Member Request", vec![Text("Member requests to borrow a book")]),
            step(
                "Check Availability",
                vec![
                    Code("issue_book"),
                    Text(" procedure checks if book is available"),
                ],
            ),
            step(
                "Book Issued",
                vec![
                    Text("Creates loan record and calls "),
                    Code("after_loan_insert"),
                    Text(" trigger"),
                ],
            ),
            step(
                "Available Copies Updated",
                vec![Text("Trigger decrements available_copies in books table")],
            ),
        ],
    }
}

pub fn book_return() -> Workflow {
    use Span::*;

    Workflow {
        title: "Book Return Process",
        tone: Tone::Green,
        steps: vec![
            step("Book Return", vec![Text("Member returns a book")]),
            step(
                "Check Due Date",
                vec![
                    Code("return_book"),
                    Text(" procedure checks if return is late"),
                ],
            ),
            FlowStep::Branch {
                label: "Late Return?",
                outcomes: vec![
                    Outcome {
                        answer: "Yes",
                        result: "Create Fine",
                        tone: Tone::Red,
                    },
                    Outcome {
                        answer: "No",
                        result: "No Fine",
                        tone: Tone::Green,
                    },
                ],
            },
            step(
                "Update Loan Status",
                vec![Text("Mark loan as returned, update return_date")],
            ),
            step(
                "Update Book Availability",
                vec![
                    Code("after_loan_update"),
                    Text(" trigger increments available_copies"),
                ],
            ),
        ],
    }
}

pub fn all() -> Vec<Workflow> {
    vec![checkout(), book_return()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_flows() {
        let flows = all();
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].steps.len(), 4);
        assert_eq!(flows[1].steps.len(), 5);
    }

    #[test]
    fn test_return_flow_branches_on_lateness() {
        let flow = book_return();
        match &flow.steps[2] {
            FlowStep::Branch { label, outcomes } => {
                assert_eq!(*label, "Late Return?");
                let results: Vec<&str> = outcomes.iter().map(|o| o.result).collect();
                assert_eq!(results, vec!["Create Fine", "No Fine"]);
            }
            other => panic!("expected a branch, got {:?}", other),
        }
    }
}
