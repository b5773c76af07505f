mod ambiguity_test;
mod json_test;
