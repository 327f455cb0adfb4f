//! Line-oriented question/answer loop behind `talkdoc-chat`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::classifier::{TopicClassifier, REFUSAL_MESSAGE};
use crate::pipeline::RagPipeline;

const PROMPT: &str = "You: ";

pub enum Reply {
    Answer(String),
    Refused,
    Failed(String),
}

/// Gate (when configured) then pipeline. Errors become `Reply::Failed` so
/// the session keeps going.
pub async fn respond(
    pipeline: &RagPipeline,
    classifier: Option<&TopicClassifier>,
    question: &str,
) -> Reply {
    if let Some(classifier) = classifier {
        match classifier.is_medical(question).await {
            Ok(true) => {}
            Ok(false) => return Reply::Refused,
            Err(err) => return Reply::Failed(err.to_string()),
        }
    }

    match pipeline.answer(question).await {
        Ok(answer) => Reply::Answer(answer),
        Err(err) => Reply::Failed(err.to_string()),
    }
}

/// Runs until `exit`/`quit` or end of input. Blank lines are ignored.
pub async fn run<R, W>(
    pipeline: &RagPipeline,
    classifier: Option<&TopicClassifier>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            output.write_all(b"Goodbye!\n").await?;
            break;
        }

        let text = match respond(pipeline, classifier, question).await {
            Reply::Answer(answer) => format!("\n--- Final Answer ---\n{}\n\n", answer),
            Reply::Refused => format!("\n{}\n\n", REFUSAL_MESSAGE),
            Reply::Failed(message) => format!("Error: {}\n\n", message),
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.flush().await
}
